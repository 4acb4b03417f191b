use std::{env, fs, path::Path, process};

mod runner;

const DEFAULT_DATABASE_PATH: &str = "data/attendance.db";

const USAGE: &str = "usage: migration [up | fresh | clean]

  up     apply the schema (default)
  fresh  drop the attendance database file, then apply the schema
  clean  drop the attendance database file";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let db_path = env::var("DATABASE_PATH").unwrap_or_else(|_| DEFAULT_DATABASE_PATH.into());
    let url = format!("sqlite://{db_path}?mode=rwc");

    match env::args().nth(1).as_deref() {
        None | Some("up") => {
            create_db_dir(&db_path);
            runner::run_all_migrations(&url).await;
        }
        Some("fresh") => {
            remove_db_file(&db_path);
            create_db_dir(&db_path);
            runner::run_all_migrations(&url).await;
        }
        Some("clean") => remove_db_file(&db_path),
        Some(other) => {
            eprintln!("unknown command `{other}`\n\n{USAGE}");
            process::exit(2);
        }
    }
}

fn remove_db_file(path: &str) {
    let db_path = Path::new(path);
    if !db_path.exists() {
        println!("No attendance database at {}", db_path.display());
        return;
    }
    if let Err(err) = fs::remove_file(db_path) {
        eprintln!("Could not delete {}: {err}", db_path.display());
        process::exit(1);
    }
    println!("Deleted attendance database {}", db_path.display());
}

fn create_db_dir(path: &str) {
    let Some(parent) = Path::new(path).parent() else {
        return;
    };
    if let Err(err) = fs::create_dir_all(parent) {
        eprintln!("Could not create {}: {err}", parent.display());
        process::exit(1);
    }
}
