use cellctl::cli::{
    camera, colors, ping, publish, run, status, handle_completions, handle_config_init,
    CameraCommands, Cli, ColorsCommands, Commands, ConfigCommands,
};
use clap::Parser;

fn print_output(result: Result<String, Box<dyn std::error::Error>>) -> Result<(), Box<dyn std::error::Error>> {
    let output = result?;
    println!("{}", output);
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run(args) => run::run_panel(args).await,
        Commands::Ping(args) => print_output(ping::handle_ping(&args).await),
        Commands::Camera(cmd) => match cmd {
            CameraCommands::Start(args) => print_output(camera::handle_camera_start(&args).await),
            CameraCommands::Stop(args) => print_output(camera::handle_camera_stop(&args).await),
            CameraCommands::List(args) => print_output(camera::handle_camera_list(&args).await),
            CameraCommands::Detections(args) => {
                print_output(camera::handle_camera_detections(&args).await)
            }
        },
        Commands::Colors(cmd) => match cmd {
            ColorsCommands::List(args) => print_output(colors::handle_colors_list(&args).await),
            ColorsCommands::Set(args) => print_output(colors::handle_colors_set(&args).await),
            ColorsCommands::Remove(args) => print_output(colors::handle_colors_remove(&args).await),
            ColorsCommands::Import(args) => print_output(colors::handle_colors_import(&args).await),
        },
        Commands::Status(args) => print_output(status::handle_status(&args).await),
        Commands::Estop(args) => print_output(publish::handle_estop(&args).await),
        Commands::Publish(args) => print_output(publish::handle_publish(&args).await),
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Init(args) => print_output(handle_config_init(&args)),
        },
        Commands::Completions(args) => {
            handle_completions(&args);
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
