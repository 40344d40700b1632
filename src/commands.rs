//! CLI command implementations

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;

use neurotrace_analysis::{
    compute_sholl, run_batch, sholl_csv, AnalysisPool, BatchInput, TreeSnapshot,
};
use neurotrace_core::{compute_stats, parse_file, serialize, Morphology, Severity};

fn load(path: &Path) -> anyhow::Result<Morphology> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let morphology = parse_file(&file_name, &content)
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(morphology)
}

fn print_warnings(m: &Morphology) {
    for warning in &m.warnings {
        let severity = match warning.severity() {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        };
        match warning.line {
            Some(line) => println!("{severity}: line {line}: {}", warning.message),
            None => println!("{severity}: {}", warning.message),
        }
    }
}

pub fn stats(file: PathBuf, json: bool) -> anyhow::Result<()> {
    let m = load(&file)?;
    let stats = compute_stats(&m);

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    print_warnings(&m);
    println!("nodes:           {}", stats.total_nodes);
    println!("roots:           {}", stats.root_count);
    println!("total length:    {:.2} µm", stats.total_length);
    println!("branch points:   {}", stats.branch_points);
    println!("terminal tips:   {}", stats.terminal_tips);
    println!("max path:        {:.2} µm", stats.max_path_distance);
    println!("max branch order: {}", stats.max_branch_order);
    for (node_type, count) in &stats.node_count_by_type {
        println!("  type {node_type}: {count}");
    }
    Ok(())
}

pub fn validate(file: PathBuf) -> anyhow::Result<()> {
    let m = load(&file)?;
    if m.warnings.is_empty() {
        println!("ok: {} nodes, no warnings", m.node_count());
    } else {
        print_warnings(&m);
        println!("{} warnings", m.warnings.len());
    }
    Ok(())
}

pub fn convert(file: PathBuf, output: PathBuf) -> anyhow::Result<()> {
    let m = load(&file)?;
    print_warnings(&m);
    let swc = serialize(&m);
    fs::write(&output, swc).with_context(|| format!("writing {}", output.display()))?;
    tracing::info!("wrote {} nodes to {}", m.node_count(), output.display());
    Ok(())
}

pub fn morpho(file: PathBuf, json: bool) -> anyhow::Result<()> {
    let m = load(&file)?;
    let pool = AnalysisPool::new(1);
    let result = pool.compute_blocking(TreeSnapshot::from(&m))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("total length:    {:.2} µm", result.total_length);
    println!("total surface:   {:.2} µm²", result.total_surface);
    println!("total volume:    {:.2} µm³", result.total_volume);
    println!("branches:        {}", result.branch_count);
    println!("tips:            {}", result.tip_count);
    println!("max Strahler:    {}", result.max_strahler_order);
    println!("hull volume:     {:.2} µm³", result.convex_hull_volume);
    println!("fractal dim:     {:.3}", result.fractal_dimension);
    Ok(())
}

pub fn sholl(file: PathBuf, step: f64, csv: Option<PathBuf>) -> anyhow::Result<()> {
    anyhow::ensure!(step > 0.0, "--step must be positive");
    let m = load(&file)?;
    let series = compute_sholl(&m, step);

    if let Some(out) = csv {
        fs::write(&out, sholl_csv(&series))
            .with_context(|| format!("writing {}", out.display()))?;
        tracing::info!("wrote {} shells to {}", series.len(), out.display());
    } else {
        for point in &series {
            println!("{}\t{}", point.radius, point.intersections);
        }
    }
    Ok(())
}

pub fn batch(files: Vec<PathBuf>, jobs: Option<usize>, csv: Option<PathBuf>) -> anyhow::Result<()> {
    anyhow::ensure!(!files.is_empty(), "no input files");

    let mut inputs = Vec::with_capacity(files.len());
    for path in &files {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        inputs.push(BatchInput { file_name, content });
    }

    let handle = run_batch(inputs, jobs);
    let total = handle.total();

    let mut rows = String::from(
        "file,nodes,total_length,total_surface,total_volume,branches,tips,max_strahler,hull_volume,fractal_dimension,error\n",
    );
    for record in handle.results.iter() {
        match &record.error {
            Some(err) => println!("[{}/{}] {}: error: {err}", handle.done(), total, record.file_name),
            None => println!(
                "[{}/{}] {}: {} nodes, {:.2} µm",
                handle.done(),
                total,
                record.file_name,
                record.node_count,
                record.total_length
            ),
        }
        writeln!(
            rows,
            "{},{},{},{},{},{},{},{},{},{},{}",
            record.file_name,
            record.node_count,
            record.total_length,
            record.total_surface,
            record.total_volume,
            record.branch_count,
            record.tip_count,
            record.max_strahler_order,
            record.convex_hull_volume,
            record.fractal_dimension,
            record.error.as_deref().unwrap_or_default()
        )?;
    }

    if let Some(out) = csv {
        fs::write(&out, rows).with_context(|| format!("writing {}", out.display()))?;
        tracing::info!("wrote {total} rows to {}", out.display());
    }
    Ok(())
}
