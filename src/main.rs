fn main() {
    if let Err(err) = radial_mindmap::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
