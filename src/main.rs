fn main() -> anyhow::Result<()> {
    dom_copier::run(std::env::args_os())
}
