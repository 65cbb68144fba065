//! Dashboard entry point: CLI wiring and config-driven table rendering.

use std::path::{Path, PathBuf};
use std::process;

use chrono::NaiveDate;

use energy_dash::config::DashboardConfig;
use energy_dash::format::{format_percent, format_thousands};
use energy_dash::io::export::DirectorySink;
use energy_dash::model::{DashboardOverview, SummaryPeriod, SummaryStat};
use energy_dash::report::{Granularity, MachineSelection, QuickRange, ReportCategory, ReportConfig};
use energy_dash::source::{DataSource, MockDataSource};
use energy_dash::stats::{ConsumptionStats, ReportSummary, StatusCounts, prediction_accuracy};
use energy_dash::table::export::{
    Column, chart_columns, consumption_columns, export_rows, ideal_value_columns, report_columns,
};
use energy_dash::table::normalize::{
    chart_series, normalize_consumption, normalize_ideal_values, normalize_report,
};
use energy_dash::table::{CategoryFilter, ConsumptionRow, IdealValueRow, ReportRow, TableRow};
use energy_dash::view::TableView;
use energy_dash::{Error, Result};

/// Which dashboard screen to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Overview,
    Consumption,
    Ideal,
    Summary,
    Report,
}

/// Parsed CLI arguments.
struct CliArgs {
    config_path: Option<String>,
    seed_override: Option<u64>,
    today_override: Option<NaiveDate>,
    screen: Screen,
    machine: Option<String>,
    search: Option<String>,
    category: Option<String>,
    /// Header clicks, applied in order.
    sorts: Vec<String>,
    page: Option<usize>,
    page_size: Option<usize>,
    period: Option<SummaryPeriod>,
    range: Option<QuickRange>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    granularity: Option<Granularity>,
    report_category: ReportCategory,
    export: Option<Option<PathBuf>>,
    /// Export the chart series instead of the consumption table.
    chart: bool,
    #[cfg(feature = "api")]
    serve: bool,
    #[cfg(feature = "api")]
    port: Option<u16>,
}

fn print_help() {
    eprintln!("energy-dash: energy consumption dashboard tables");
    eprintln!();
    eprintln!("Usage: energy-dash [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <path>          Load settings from TOML config file");
    eprintln!("  --seed <u64>             Override mock data seed");
    eprintln!("  --today <YYYY-MM-DD>     Override today's date");
    eprintln!("  --view <name>            overview | consumption | ideal | summary | report");
    eprintln!("  --machine <id|all>       Machine to show (default: first machine)");
    eprintln!("  --search <text>          Case-insensitive search");
    eprintln!("  --category <name>        Category filter (e.g. actual, optimal, high)");
    eprintln!("  --sort <field>           Click a column header; repeat to toggle");
    eprintln!("  --page <n>               Page to show (1-based)");
    eprintln!("  --page-size <n>          Rows per page (one of table.page_sizes)");
    eprintln!("  --period <name>          Summary period: week | month | year");
    eprintln!("  --range <name>           last-week | last-month | last-quarter | last-year");
    eprintln!("  --from <YYYY-MM-DD>      Report start date");
    eprintln!("  --to <YYYY-MM-DD>        Report end date");
    eprintln!("  --granularity <name>     daily | weekly | monthly");
    eprintln!("  --report <name>          consumption | efficiency | comparison");
    eprintln!("  --export [dir]           Write the filtered table as CSV");
    eprintln!("  --chart                  With --export on the consumption view, write the chart series");
    #[cfg(feature = "api")]
    {
        eprintln!("  --serve                  Start REST API server");
        eprintln!("  --port <u16>             API server port (default from config)");
    }
    eprintln!("  --help                   Show this help message");
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("error: {message}");
    process::exit(1);
}

/// Returns the value following the flag at `args[*i]`, advancing `i`.
fn take_value(args: &[String], i: &mut usize, flag: &str) -> String {
    *i += 1;
    match args.get(*i) {
        Some(v) => v.clone(),
        None => fail(format!("{flag} requires an argument")),
    }
}

fn parse_or_exit<T>(value: &str, flag: &str) -> T
where
    T: std::str::FromStr,
{
    value
        .parse()
        .unwrap_or_else(|_| fail(format!("{flag} value \"{value}\" is not valid")))
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        config_path: None,
        seed_override: None,
        today_override: None,
        screen: Screen::Overview,
        machine: None,
        search: None,
        category: None,
        sorts: Vec::new(),
        page: None,
        page_size: None,
        period: None,
        range: None,
        from: None,
        to: None,
        granularity: None,
        report_category: ReportCategory::Consumption,
        export: None,
        chart: false,
        #[cfg(feature = "api")]
        serve: false,
        #[cfg(feature = "api")]
        port: None,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--config" => cli.config_path = Some(take_value(&args, &mut i, "--config")),
            "--seed" => {
                let v = take_value(&args, &mut i, "--seed");
                cli.seed_override = Some(parse_or_exit(&v, "--seed"));
            }
            "--today" => {
                let v = take_value(&args, &mut i, "--today");
                cli.today_override = Some(parse_or_exit(&v, "--today"));
            }
            "--view" => {
                cli.screen = match take_value(&args, &mut i, "--view").as_str() {
                    "overview" => Screen::Overview,
                    "consumption" => Screen::Consumption,
                    "ideal" => Screen::Ideal,
                    "summary" => Screen::Summary,
                    "report" => Screen::Report,
                    other => fail(format!("unknown view \"{other}\"")),
                };
            }
            "--machine" => cli.machine = Some(take_value(&args, &mut i, "--machine")),
            "--search" => cli.search = Some(take_value(&args, &mut i, "--search")),
            "--category" => cli.category = Some(take_value(&args, &mut i, "--category")),
            "--sort" => cli.sorts.push(take_value(&args, &mut i, "--sort")),
            "--page" => {
                let v = take_value(&args, &mut i, "--page");
                cli.page = Some(parse_or_exit(&v, "--page"));
            }
            "--page-size" => {
                let v = take_value(&args, &mut i, "--page-size");
                cli.page_size = Some(parse_or_exit(&v, "--page-size"));
            }
            "--period" => {
                let v = take_value(&args, &mut i, "--period");
                cli.period = Some(parse_or_exit(&v, "--period"));
            }
            "--range" => {
                let v = take_value(&args, &mut i, "--range");
                cli.range = Some(parse_or_exit(&v, "--range"));
            }
            "--from" => {
                let v = take_value(&args, &mut i, "--from");
                cli.from = Some(parse_or_exit(&v, "--from"));
            }
            "--to" => {
                let v = take_value(&args, &mut i, "--to");
                cli.to = Some(parse_or_exit(&v, "--to"));
            }
            "--granularity" => {
                let v = take_value(&args, &mut i, "--granularity");
                cli.granularity = Some(parse_or_exit(&v, "--granularity"));
            }
            "--report" => {
                let v = take_value(&args, &mut i, "--report");
                cli.report_category = parse_or_exit(&v, "--report");
            }
            "--export" => {
                // Optional directory operand; otherwise the configured one.
                match args.get(i + 1) {
                    Some(next) if !next.starts_with("--") => {
                        i += 1;
                        cli.export = Some(Some(PathBuf::from(next)));
                    }
                    _ => cli.export = Some(None),
                }
            }
            "--chart" => cli.chart = true,
            #[cfg(feature = "api")]
            "--serve" => cli.serve = true,
            #[cfg(feature = "api")]
            "--port" => {
                let v = take_value(&args, &mut i, "--port");
                cli.port = Some(parse_or_exit(&v, "--port"));
            }
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

/// Applies the CLI's search, category, header clicks and page to `view`.
fn configure<R: TableRow>(view: &mut TableView<R>, cli: &CliArgs) -> Result<()> {
    if let Some(ref text) = cli.search {
        view.set_search(text.as_str());
    }
    if let Some(ref category) = cli.category {
        let filter = CategoryFilter::parse(category);
        if let CategoryFilter::Unknown(ref name) = filter {
            log::warn!("category \"{name}\" matches no rows");
        }
        view.set_category(filter);
    }
    for field in &cli.sorts {
        view.sort_by(field.parse::<R::Field>()?);
    }
    if let Some(page) = cli.page {
        view.go_to_page(page);
    }
    Ok(())
}

/// Prints the current page and, if requested, exports the filtered rows.
fn render<R: TableRow>(
    view: &TableView<R>,
    line: fn(&R) -> String,
    header: &str,
    export: Option<(&Path, &str, NaiveDate, Vec<Column<R>>)>,
) -> Result<()> {
    println!("{header}");
    for row in view.visible() {
        println!("{}", line(&row));
    }
    println!("{}", view.window());

    if let Some((dir, prefix, today, columns)) = export {
        let mut sink = DirectorySink::new(dir);
        let outcome = export_rows(&view.export_rows(), &columns, prefix, today, &mut sink)?;
        eprintln!("Exported {} rows to {}", outcome.rows, outcome.location.display());
    }
    Ok(())
}

fn consumption_line(r: &ConsumptionRow) -> String {
    format!(
        "{:<14} {:>12} {:>12} {:>8}",
        r.formatted_date, r.consumption_display, r.prediction_display, r.difference_display
    )
}

fn ideal_line(r: &IdealValueRow) -> String {
    format!(
        "{:<6} {:<18} {:>10} {:>6} {:<8}",
        r.machine_id, r.machine_name, r.ideal_display, r.tolerance_display, r.status
    )
}

fn report_line(r: &ReportRow) -> String {
    format!(
        "{:<12} {:<6} {:>10} {:>10} {:>8} {}",
        r.date_display,
        r.machine.as_deref().unwrap_or("-"),
        r.consumption_display,
        r.ideal_display,
        r.difference_display,
        r.band.as_str()
    )
}

fn print_overview(o: &DashboardOverview) {
    println!("Machines:              {}", o.total_machines);
    println!("Total consumption:     {} kWh", format_thousands(o.total_consumption, 0));
    println!("Average efficiency:    {}", format_percent(o.avg_efficiency));
    println!("Prediction accuracy:   {}", format_percent(o.prediction_accuracy));
    if !o.recent_alerts.is_empty() {
        println!("\nRecent alerts:");
        for a in &o.recent_alerts {
            println!("  [{}] {}: {}", a.timestamp.format("%Y-%m-%d %H:%M"), a.machine, a.message);
        }
    }
}

fn print_summary(period: SummaryPeriod, stats: &[SummaryStat]) {
    println!("{:<8} {:>10} {:>10}", format!("{period:?}"), "Actual", "Predicted");
    for s in stats {
        println!(
            "{:<8} {:>10} {:>10}",
            s.name,
            format_thousands(s.actual, 0),
            format_thousands(s.predicted, 0)
        );
    }
    match prediction_accuracy(stats) {
        Some(acc) => println!("Accuracy: {}", format_percent(acc)),
        None => println!("Accuracy: -"),
    }
}

async fn run(cli: &CliArgs, cfg: &DashboardConfig) -> Result<()> {
    let today = cfg.source.resolved_today();
    let source = MockDataSource::new(cfg.source.seed, today);
    let page_size = cfg.table.resolve_page_size(cli.page_size)?;
    let export_dir = cli
        .export
        .as_ref()
        .map(|dir| dir.clone().unwrap_or_else(|| cfg.export.directory.clone()));

    match cli.screen {
        Screen::Overview => print_overview(&source.fetch_overview().await?),
        Screen::Summary => {
            let period = cli.period.unwrap_or_default();
            let stats = source.fetch_summary_stats(Some(period)).await?;
            print_summary(period, &stats);
        }
        Screen::Consumption => {
            let machine = match cli.machine {
                Some(ref id) => id.clone(),
                None => source
                    .fetch_machine_ids()
                    .await?
                    .into_iter()
                    .next()
                    .ok_or_else(|| Error::UnknownMachine(String::new()))?,
            };
            let series = source.fetch_machine_consumption(&machine).await?;
            log::info!(
                "loaded {} past and {} predicted records for {machine}",
                series.past.len(),
                series.prediction.len()
            );
            println!("Machine {machine}");
            println!("{}\n", ConsumptionStats::from_series(&series));

            let mut view =
                TableView::consumption(normalize_consumption(&series.past, &series.prediction), page_size)?;
            configure(&mut view, cli)?;
            let table_export = export_dir
                .as_deref()
                .filter(|_| !cli.chart)
                .map(|d| (d, "consumption_table_data", today, consumption_columns()));
            render(
                &view,
                consumption_line,
                "Date           Actual (kWh)  Pred. (kWh)     Diff",
                table_export,
            )?;

            if let Some(dir) = export_dir.as_deref().filter(|_| cli.chart) {
                let points = chart_series(&series.past, &series.prediction);
                let mut sink = DirectorySink::new(dir);
                let outcome = export_rows(&points, &chart_columns(), "consumption_data", today, &mut sink)?;
                eprintln!("Exported {} chart points to {}", outcome.rows, outcome.location.display());
            }
        }
        Screen::Ideal => {
            let records = source.fetch_ideal_values().await?;
            log::info!("loaded {} ideal values", records.len());
            println!("{}\n", StatusCounts::from_records(&records));
            let mut view = TableView::ideal_values(normalize_ideal_values(&records), page_size)?;
            configure(&mut view, cli)?;
            render(
                &view,
                ideal_line,
                "ID     Name                    Ideal    Tol. Status",
                export_dir
                    .as_deref()
                    .map(|d| (d, "ideal_values", today, ideal_value_columns())),
            )?;
        }
        Screen::Report => {
            let machine = cli
                .machine
                .as_deref()
                .map_or(MachineSelection::All, MachineSelection::parse);
            let mut config = ReportConfig::for_category(cli.report_category, machine, today);
            if let Some(range) = cli.range {
                config = config.with_range(range, today);
            }
            if let Some(from) = cli.from {
                config.start_date = from;
            }
            if let Some(to) = cli.to {
                config.end_date = to;
            }
            if let Some(granularity) = cli.granularity {
                config.granularity = granularity;
            }

            let records = source.fetch_report_data(&config).await?;
            log::info!("generated {} report rows", records.len());
            println!("{} ({} to {})", config.category.title(), config.start_date, config.end_date);
            if let Some(summary) = ReportSummary::from_records(&records) {
                println!("{summary}\n");
            }

            let mut view = TableView::report(normalize_report(&records), page_size)?;
            configure(&mut view, cli)?;
            render(
                &view,
                report_line,
                "Date         Machine  Actual      Ideal     Diff Band",
                export_dir
                    .as_deref()
                    .map(|d| (d, "report_data", today, report_columns())),
            )?;
        }
    }
    Ok(())
}

fn main() {
    env_logger::init();
    let cli = parse_args();

    let mut cfg = match cli.config_path {
        Some(ref path) => DashboardConfig::from_toml_file(Path::new(path)).unwrap_or_else(|e| {
            eprintln!("{e}");
            process::exit(1);
        }),
        None => DashboardConfig::default(),
    };

    if let Some(seed) = cli.seed_override {
        cfg.source.seed = seed;
    }
    if let Some(today) = cli.today_override {
        cfg.source.today = Some(today);
    }
    #[cfg(feature = "api")]
    if let Some(port) = cli.port {
        cfg.server.port = port;
    }

    let errors = cfg.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    let rt = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("error: failed to create tokio runtime: {e}");
        process::exit(1);
    });

    #[cfg(feature = "api")]
    if cli.serve {
        use std::net::{IpAddr, SocketAddr};
        use std::sync::Arc;

        let ip: IpAddr = parse_or_exit(&cfg.server.host, "server.host");
        let addr = SocketAddr::new(ip, cfg.server.port);
        let state = Arc::new(energy_dash::api::AppState {
            source: MockDataSource::new(cfg.source.seed, cfg.source.resolved_today()),
            table: cfg.table.clone(),
        });
        if let Err(e) = rt.block_on(energy_dash::api::serve(state, addr)) {
            fail(format!("server error: {e}"));
        }
        return;
    }

    if let Err(e) = rt.block_on(run(&cli, &cfg)) {
        fail(e.user_message());
    }
}
