fn main() {
    inkparse::cli::run();
}
