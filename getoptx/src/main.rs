use getoptx::host::StdHost;

fn main() {
    getoptx::logging::init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let status = getoptx::run(&mut StdHost, &args);
    std::process::exit(status);
}
