#![forbid(unsafe_code)]
use anyhow::Result;
use clap::{Parser, Subcommand};
use edt::{
    expand_schedule, io, parse_iso_date,
    sink::{prepare_agenda, TextAgenda},
    storage::{JsonStorage, Storage},
    validate::{validate_schedule, ValidationError},
};
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI minimaliste d'emploi du temps (sans base de données)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Fichier JSON du document d'emploi du temps
    #[arg(long, global = true, default_value = "schedule.json")]
    schedule: String,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Vérifier la cohérence du document
    Validate {
        /// Export CSV des violations (optionnel)
        #[arg(long)]
        report: Option<String>,
    },

    /// Déployer les récurrences en instances datées
    Expand {
        #[arg(long)]
        out_json: Option<String>,
        #[arg(long)]
        out_csv: Option<String>,
    },

    /// Générer l'agenda textuel d'une journée
    Agenda {
        /// Date au format YYYY-MM-DD
        #[arg(long)]
        date: String,
        /// Fichier de sortie (texte brut) ; impression sinon
        #[arg(long)]
        out: Option<String>,
    },

    /// Lister les séries du registre et leurs déclinaisons
    Series,

    /// Réécrire le document en JSON canonique (écriture atomique)
    Normalize,
}

fn print_issues(err: &ValidationError) {
    eprintln!("Found {} issue(s)", err.issues.len());
    for issue in &err.issues {
        eprintln!("  {issue}");
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let storage = JsonStorage::open(&cli.schedule)?;
    let schedule = storage.load()?;

    let code = match cli.cmd {
        Commands::Validate { report } => match validate_schedule(&schedule) {
            Ok(_) => {
                println!("OK: schedule is consistent");
                0
            }
            Err(err) => {
                print_issues(&err);
                if let Some(path) = report {
                    io::export_issues_csv(path, &err.issues)?;
                }
                // Code 2 = document refusé
                2
            }
        },

        Commands::Expand { out_json, out_csv } => match validate_schedule(&schedule) {
            Err(err) => {
                print_issues(&err);
                2
            }
            Ok(validated) => {
                let instances = expand_schedule(&validated)?;
                if let Some(path) = out_json {
                    io::export_instances_json(path, &instances)?;
                }
                if let Some(path) = out_csv {
                    io::export_instances_csv(path, &instances)?;
                }
                // impression compacte
                for instance in &instances {
                    println!(
                        "{} | {} → {} | {}",
                        instance.class_id.as_deref().unwrap_or("-"),
                        instance.start_date_time_local,
                        instance.end_date_time_local,
                        instance.title
                    );
                }
                0
            }
        },

        Commands::Agenda { date, out } => {
            let on = parse_iso_date(&date)?;
            match validate_schedule(&schedule) {
                Err(err) => {
                    print_issues(&err);
                    2
                }
                Ok(validated) => {
                    let instances = expand_schedule(&validated)?;
                    let agenda = prepare_agenda(&instances, on, &TextAgenda)?;
                    match out {
                        Some(path) => {
                            std::fs::write(&path, &agenda.content)?;
                            println!(
                                "Agenda written for {} ({} entries)",
                                agenda.date.format("%Y-%m-%d"),
                                agenda.entries
                            );
                        }
                        None => print!("{}", agenda.content),
                    }
                    0
                }
            }
        }

        Commands::Series => {
            for (key, entry) in schedule.series.iter() {
                println!("{} | {} | {}", key, entry.title, entry.variants.join(","));
            }
            0
        }

        Commands::Normalize => match validate_schedule(&schedule) {
            Err(err) => {
                print_issues(&err);
                2
            }
            Ok(_) => {
                storage.save(&schedule)?;
                println!("Document normalized: {}", storage.path().display());
                0
            }
        },
    };

    std::process::exit(code);
}
