fn main() {
    std::process::exit(flagwork::cli::run());
}
