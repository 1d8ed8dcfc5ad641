use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "Start the bot")]
    Start,
    #[command(description = "Set the child's name and age, e.g. /profile Asha 9", parse_with = "split")]
    Profile { name: String, age: String },
    #[command(description = "Play the next game, or a named one: /play clock-reading")]
    Play(String),
    #[command(description = "List the games for this age")]
    Games,
    #[command(description = "Show the results so far")]
    Report,
    #[command(description = "Ask for a dyscalculia screening summary")]
    Diagnose,
    #[command(description = "Copy passages by hand, then send a photo to check")]
    Handwriting,
    #[command(description = "Forget the profile and all results")]
    Reset,
    #[command(description = "Show help message")]
    Help,
}
