//! Inspect a bundle directory by loading one resource through the cache

use std::process::ExitCode;

use assetbundle::prelude::*;

fn usage() -> ExitCode {
    eprintln!("usage: bundle-inspect <config.ron> <resource> [type]");
    ExitCode::FAILURE
}

fn run(config_path: &str, resource: &str, resource_type: ResourceType) -> Result<(), BundleError> {
    let config = BundleConfig::load_ron(config_path)?;
    let source = FsBundleSource::from_config(config.clone())?;
    let mut manager = BundleManager::with_config(source, config);

    let mut descriptor = manager.resolve(resource, resource_type)?;
    log::info!(
        "Resolved '{}' -> '{}' ({} dependencies)",
        descriptor.name,
        descriptor.path,
        descriptor.dependencies.len()
    );

    let Some(asset) = manager.load(&mut descriptor) else {
        return Err(BundleError::UnknownResource {
            name: descriptor.name.clone(),
        });
    };
    println!("{}: {} byte(s)", asset.name(), asset.get().map_or(0, Vec::len));

    // Second request is served from the cache
    manager.load(&mut descriptor);
    for name in manager.resident_names() {
        println!(
            "  {name} (refs: {})",
            manager.reference_count(name).unwrap_or_default()
        );
    }

    manager.unload_resource(&descriptor, false);
    manager.unload_all_resource(&descriptor, true);
    println!("{}", manager.stats());
    manager.stats().log_summary();
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (config_path, resource) = match args.as_slice() {
        [config, resource, ..] => (config.as_str(), resource.as_str()),
        _ => return usage(),
    };
    let resource_type = match args.get(2).map(|t| t.parse::<u32>()) {
        None => ResourceType::default(),
        Some(Ok(ty)) => ResourceType(ty),
        Some(Err(_)) => return usage(),
    };

    if let Err(e) = run(config_path, resource, resource_type) {
        eprintln!("bundle-inspect error: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
