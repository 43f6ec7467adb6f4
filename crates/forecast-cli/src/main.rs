//! forecast-cli: inspección y ejecución del pipeline de forecasts.
//!
//! Códigos de salida: 0 éxito, 2 uso incorrecto, 4 ejecución fallida o
//! abortada, 5 error de preparación (config, archivos, backend).

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use forecast_adapters::trigger::{EngineStarter, FileParameterSource};
use forecast_adapters::{config, forecast_pipeline, CleanupSupervisor, HttpInvoker, LogPublisher, PipelineConfig, Scenario,
                        SimulatedInvoker, StepInvoker, TriggerAdapter, TriggerFilter};
use forecast_core::graph::EdgeKind;
use forecast_core::{ExecutionState, ExecutionStatus, FlowEngine, StateNode, WorkflowGraph};
use log::{error, warn};
use serde_json::Value;

const EXIT_EXECUTION_FAILED: u8 = 4;
const EXIT_SETUP_ERROR: u8 = 5;

#[derive(Debug, Parser)]
#[command(name = "forecast-cli", version, about = "Forecast training pipeline orchestrator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Imprime estados, aristas, políticas y hash de definición del grafo.
    Graph {
        /// Descripción JSON completa en lugar del resumen.
        #[arg(long)]
        json: bool,
    },
    /// Corre una ejecución con el input dado.
    Run {
        #[arg(long)]
        input: PathBuf,
        /// Backend simulado: happy, slow-import, predictor-failed, deletion-failed.
        #[arg(long)]
        simulate: Option<Scenario>,
    },
    /// Procesa una notificación de objeto creado.
    Trigger {
        #[arg(long)]
        event: PathBuf,
        /// Objeto de parámetros; por defecto el configurado en el entorno.
        #[arg(long)]
        params: Option<PathBuf>,
        #[arg(long)]
        simulate: Option<Scenario>,
    },
    /// Valida e imprime la tabla de recursos y sus outputs.
    Resources {
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    config::init_dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(EXIT_SETUP_ERROR)
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let cfg = PipelineConfig::from_env().context("loading configuration")?;
    match cli.command {
        Command::Graph { json } => {
            let graph = build_graph(Arc::new(SimulatedInvoker::new()), &cfg)?;
            print_graph(&graph, json)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Run { input, simulate } => {
            let input = read_json(&input).await?;
            let invoker = make_invoker(simulate, &cfg)?;
            let engine = Arc::new(FlowEngine::new(build_graph(Arc::clone(&invoker), &cfg)?));
            let supervisor = CleanupSupervisor::new(invoker, &cfg);

            let handle = engine.spawn(input);
            let abort = handle.abort.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("interrupt received, aborting execution");
                    abort.abort();
                }
            });
            let (state, report) = supervisor.supervise(handle).await?;
            if let Some(report) = report {
                println!("cleanup: attempted={:?} failed={}", report.attempted, report.failed.len());
            }
            print_execution(&engine, &state);
            Ok(exit_for(&[state]))
        }
        Command::Trigger { event, params, simulate } => {
            let notification = read_json(&event).await?;
            let invoker = make_invoker(simulate, &cfg)?;
            let engine = Arc::new(FlowEngine::new(build_graph(invoker, &cfg)?));
            let starter = Arc::new(EngineStarter::new(Arc::clone(&engine)));
            let params = params.unwrap_or_else(|| cfg.parameter_path.clone());
            let adapter = TriggerAdapter::new(TriggerFilter::new(cfg.trigger_prefix.clone(), cfg.trigger_suffix.clone()),
                                              Arc::new(FileParameterSource::new(params)),
                                              starter.clone());

            let ids = adapter.handle(&notification).await?;
            println!("started {} execution(s)", ids.len());
            let mut finished = Vec::new();
            for handle in starter.take_handles().await {
                let state = handle.wait().await?;
                print_execution(&engine, &state);
                finished.push(state);
            }
            Ok(exit_for(&finished))
        }
        Command::Resources { json } => {
            let graph = build_graph(Arc::new(SimulatedInvoker::new()), &cfg)?;
            match forecast_infra::validated_stack(&cfg, graph.definition_hash()) {
                Ok(table) => {
                    if json {
                        println!("{}", serde_json::to_string_pretty(&table)?);
                    } else {
                        for r in &table.resources {
                            println!("{:<32} {:?}", r.logical_id, r.kind.resource_type());
                        }
                        println!("outputs:");
                        for (name, value_of) in table.outputs() {
                            println!("  {name} = {value_of}");
                        }
                    }
                    Ok(ExitCode::SUCCESS)
                }
                Err(problems) => {
                    for p in &problems {
                        eprintln!("resource problem: {p}");
                    }
                    Ok(ExitCode::from(EXIT_SETUP_ERROR))
                }
            }
        }
    }
}

fn make_invoker(simulate: Option<Scenario>, cfg: &PipelineConfig) -> Result<Arc<dyn StepInvoker>> {
    Ok(match simulate {
        Some(scenario) => Arc::new(SimulatedInvoker::for_scenario(scenario, cfg)),
        None => Arc::new(HttpInvoker::new(cfg.require_invoker_url()?)?),
    })
}

fn build_graph(invoker: Arc<dyn StepInvoker>, cfg: &PipelineConfig) -> Result<WorkflowGraph> {
    forecast_pipeline(invoker, Arc::new(LogPublisher), cfg).context("building pipeline graph")
}

async fn read_json(path: &Path) -> Result<Value> {
    let raw = tokio::fs::read_to_string(path).await
                                             .with_context(|| format!("reading {}", path.display()))?;
    let value: Value = serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;
    if !value.is_object() {
        bail!("{} must contain a JSON object", path.display());
    }
    Ok(value)
}

fn print_graph(graph: &WorkflowGraph, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&graph.describe())?);
        return Ok(());
    }
    println!("definition hash: {}", graph.definition_hash());
    println!("start: {}", graph.start());
    for (name, node) in graph.states() {
        println!("{name} [{}]", node.type_name());
        if let StateNode::Task(task) = node {
            for r in &task.retry {
                println!("    retry {}", r.describe());
            }
            for c in &task.catch {
                println!("    catch {}", c.describe());
            }
            if let Some(t) = task.timeout {
                println!("    timeout {}s", t.as_secs());
            }
        }
    }
    println!("edges:");
    for e in graph.edges() {
        let kind = match e.kind {
            EdgeKind::Normal => "next".to_string(),
            EdgeKind::ConditionalTrue => "when true".to_string(),
            EdgeKind::ConditionalFalse => "when false".to_string(),
            EdgeKind::Catch(i) => format!("catch #{i}"),
        };
        println!("  {} -> {} ({kind})", e.from, e.to);
    }
    Ok(())
}

fn print_execution<E, R>(engine: &FlowEngine<E, R>, state: &ExecutionState)
    where E: forecast_core::EventStore + 'static,
          R: forecast_core::FlowRepository + 'static
{
    println!("execution {}: {:?}", state.id(), state.status());
    println!("  visited: {}", state.visited().join(" -> "));
    if let Some(err) = state.error() {
        println!("  error: {err}");
    }
    println!("  events: {}", engine.event_variants(state.id()).join(""));
}

fn exit_for(states: &[ExecutionState]) -> ExitCode {
    if states.iter().all(|s| s.status() == ExecutionStatus::Succeeded) {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_EXECUTION_FAILED)
    }
}
