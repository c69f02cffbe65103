use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "gumshoe", version, about = "Gumshoe - isometric detective adventure runtime")]
pub struct CliArgs {
    /// Path to the scene YAML file, relative to the project root
    #[arg(long, default_value = "scenes/office.yaml")]
    pub scene: String,

    /// Path to the game project root directory
    #[arg(long, default_value = "project")]
    pub project: String,

    /// Force the mobile control layout (virtual joystick, locked zoom)
    #[arg(long)]
    pub touch: bool,
}
