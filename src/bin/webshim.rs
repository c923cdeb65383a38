//! CLI wrapper for the webshim compatibility engine.
//!
//! Usage:
//!   webshim classify <identifier>            # Classify an identifier
//!   webshim resolve <identifier> [platform]  # Show the resolution decision
//!   webshim scan <file.js>                   # Scan a file's export surface

use std::env;
use std::path::Path;
use std::process;

use webshim::resolver::config::ShimConfig;
use webshim::resolver::classify;
use webshim::resolver::policy::{
    Decision, DelegateResolver, ResolutionEngine, ResolveError, ResolvedModule,
};
use webshim::scanner;

/// Delegate that answers with the identifier it was asked for, standing in
/// for a real bundler resolver.
struct EchoResolver;

impl DelegateResolver for EchoResolver {
    fn resolve(&mut self, identifier: &str, _platform: &str) -> Result<ResolvedModule, ResolveError> {
        Ok(ResolvedModule::bare(identifier))
    }
}

fn main() {
    let args: Vec<String> = env::args().collect();

    match args.len() {
        2 if args[1] == "-h" || args[1] == "--help" => {
            print_usage();
        }
        3 if args[1] == "classify" => {
            run_classify(&args[2]);
        }
        3 if args[1] == "resolve" => {
            run_resolve(&args[2], "web");
        }
        4 if args[1] == "resolve" => {
            run_resolve(&args[2], &args[3]);
        }
        3 if args[1] == "scan" => {
            run_scan(&args[2]);
        }
        _ => {
            print_usage();
            process::exit(1);
        }
    }
}

fn print_usage() {
    eprintln!("webshim - Mobile-to-Web Compatibility Engine");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  webshim classify <identifier>            Classify a module identifier");
    eprintln!("  webshim resolve <identifier> [platform]  Show the resolution decision (default platform: web)");
    eprintln!("  webshim scan <file.js>                   Scan a file's export surface");
}

fn run_classify(identifier: &str) {
    let classification = classify::classify(identifier, None);
    println!(
        "{}: {} ({:?} confidence) - {}",
        identifier,
        if classification.mobile_only {
            "mobile-only"
        } else {
            "web-compatible"
        },
        classification.confidence,
        classification.reason
    );
}

fn run_resolve(identifier: &str, platform: &str) {
    let engine = ResolutionEngine::new(ShimConfig::new());
    match engine.decide(identifier, platform) {
        Decision::PassThrough => println!("{} -> unchanged", identifier),
        Decision::Excluded => println!("{} -> unchanged (excluded)", identifier),
        Decision::Mapped { tier, substitute } => {
            println!("{} -> {} ({:?} tier)", identifier, substitute, tier)
        }
        Decision::Synthesized { substitute } => {
            println!("{} -> {} (synthesized stand-in)", identifier, substitute)
        }
        Decision::Refused => println!("{} -> refused (mock generation disabled)", identifier),
    }
    let mut delegate = EchoResolver;
    match engine.resolve(identifier, platform, &mut delegate) {
        Ok(resolved) => println!("resolved identifier: {}", resolved.identifier),
        Err(error) => {
            eprintln!("resolution failed: {}", error);
            process::exit(1);
        }
    }
}

fn run_scan(filename: &str) {
    let path = Path::new(filename);
    if !path.exists() {
        eprintln!("No such file: {}", filename);
        process::exit(1);
    }
    let exports = scanner::scan_with_reexports(path);
    if exports.is_empty() {
        println!("no exports found");
        return;
    }
    for export in exports {
        match export {
            scanner::ScannedExport::Named(name) => println!("named    {}", name),
            scanner::ScannedExport::Default => println!("default"),
            scanner::ScannedExport::ReexportAll(from) => println!("reexport * from {}", from),
            scanner::ScannedExport::ReexportNamed { name, from } => {
                println!("reexport {} from {}", name, from)
            }
        }
    }
}
