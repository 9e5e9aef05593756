fn main() -> Result<(), Box<dyn std::error::Error>> {
    stowage::runner::run()
}
