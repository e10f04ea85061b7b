use std::env;
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let out_dir = PathBuf::from(env::var("OUT_DIR")?);

    // Configure tonic-build
    let mut config = tonic_build::configure()
        .build_server(true)
        .build_client(true);

    // Enable file descriptor set for reflection if the feature is enabled
    if env::var_os("CARGO_FEATURE_REFLECTION").is_some() {
        config = config.file_descriptor_set_path(out_dir.join("services_descriptor.bin"));
    }

    let protos = ["proto/news_service.proto", "proto/product_service.proto"];

    println!("cargo:rerun-if-changed=proto");
    config.compile_protos(&protos, &["proto"])?;

    Ok(())
}
