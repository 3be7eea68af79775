use advanced_counter::action::AdvancedCounterAction;
use openaction::*;

#[tokio::main]
async fn main() -> OpenActionResult<()> {
    {
        use simplelog::*;
        if let Err(error) = TermLogger::init(
            LevelFilter::Debug,
            Config::default(),
            TerminalMode::Stdout,
            ColorChoice::Never,
        ) {
            eprintln!("Logger initialization failed: {}", error);
        }
    }

    log::debug!("Setting up Advanced Counter.");

    register_action(AdvancedCounterAction).await;

    // Parses `-port`, `-pluginUUID`, `-registerEvent` and `-info` itself.
    run(std::env::args().collect()).await
}
