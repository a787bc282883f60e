//! CLI `providers` command: print the provider registry.

use open_skills::embedding::ProviderRegistry;

pub fn providers() {
    let registry = ProviderRegistry::builtin();

    println!("{:<10} {:<24} {:>6}  ENDPOINT", "PROVIDER", "DEFAULT MODEL", "DIMS");
    for (id, profile) in registry.iter() {
        println!(
            "{:<10} {:<24} {:>6}  {}",
            id, profile.default_model, profile.default_dimensions, profile.endpoint
        );
    }
}
