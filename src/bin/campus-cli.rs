use campus_sdk::{CampusClient, ClientError, LoginBody};
use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "campus-cli")]
#[command(about = "Command-line client for the campus API gateway", long_about = None)]
struct Cli {
    #[arg(short, long, env = "CAMPUS_API_URL", default_value = "http://localhost:3000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check gateway and backend connectivity
    Health,
    /// List levels
    Niveles,
    /// List courses, optionally for one level
    Cursos {
        /// Level name
        #[arg(long, conflicts_with = "nivel_id")]
        nivel: Option<String>,
        /// Level id
        #[arg(long)]
        nivel_id: Option<i64>,
    },
    /// List the lessons of a course
    Lecciones { curso_id: i64 },
    /// List institutions
    Instituciones,
    /// Log in and print the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "CAMPUS_PASSWORD")]
        password: String,
    },
    /// Show the user behind a token
    Me {
        #[arg(long, env = "CAMPUS_TOKEN")]
        token: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = CampusClient::new(&cli.url);

    let result = match cli.command {
        Commands::Health => client.health().await,
        Commands::Niveles => client.niveles().await,
        Commands::Cursos {
            nivel_id: Some(id), ..
        } => client.cursos_por_nivel(id).await,
        Commands::Cursos { nivel, .. } => client.cursos(nivel.as_deref()).await,
        Commands::Lecciones { curso_id } => client.lecciones(curso_id).await,
        Commands::Instituciones => client.instituciones().await,
        Commands::Login { email, password } => client.login(&LoginBody { email, password }).await,
        Commands::Me { token } => client.me(&token).await,
    };

    print_result(result)
}

fn print_result(result: Result<Value, ClientError>) -> Result<(), Box<dyn std::error::Error>> {
    match result {
        Ok(json) => {
            println!("{}", serde_json::to_string_pretty(&json)?);
            Ok(())
        }
        Err(ClientError::Api { status, message }) => {
            eprintln!("Error: gateway returned status {}", status);
            eprintln!("Response: {}", message);
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}
