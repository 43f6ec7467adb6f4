use std::process::ExitCode;

use forecast_mlops::adapters::{config, PipelineConfig};
use forecast_mlops::validation;
use log::error;

/// Validación de punta a punta: corre cada escenario simulado del pipeline y
/// la tabla de recursos, e imprime el resumen.
#[tokio::main]
async fn main() -> ExitCode {
    config::init_dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cfg = match PipelineConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("configuración inválida: {e}");
            return ExitCode::from(5);
        }
    };

    match validation::run_all(&cfg).await {
        Ok(reports) => {
            for r in &reports {
                println!("{:<18} PerformDelete={:<5} {:?} {} :: {}",
                         r.case.scenario.as_str(),
                         r.case.perform_delete,
                         r.status,
                         r.events,
                         r.visited.join(" -> "));
            }
            println!("{} escenarios validados", reports.len());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            eprintln!("validación fallida: {e}");
            ExitCode::from(4)
        }
    }
}
