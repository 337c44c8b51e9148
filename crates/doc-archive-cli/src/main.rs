use std::process;

fn main() {
    match doc_archive_cli::run() {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("doc-archive error: {err:#}");
            process::exit(1);
        }
    }
}
