fn main() -> std::io::Result<()> {
    // The server half only backs the in-process CRI runtime used by the client tests.
    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        .compile_protos(&["proto/runtime/v1/api.proto"], &["proto"])?;

    Ok(())
}
