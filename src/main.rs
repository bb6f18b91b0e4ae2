fn main() -> anyhow::Result<()> {
    portal_room::run()
}
