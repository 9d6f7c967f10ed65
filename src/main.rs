fn main() {
    if let Err(e) = draft_reader_lib::run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}
