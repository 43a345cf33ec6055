use clap::Parser;

use mdd_rs::config::MddConfig;
use mdd_rs::manager::MddManager;
use mdd_rs::operator::MddOperator;
use mdd_rs::ops::And;
use mdd_rs::reference::NodeId;
use mdd_rs::types::Var;

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Number of queens.
    #[arg(value_name = "INT", default_value = "8")]
    n: usize,

    /// Initial number of node slots.
    #[clap(long, value_name = "INT", default_value = "1024")]
    capacity: usize,

    /// Merge all constraints at once instead of one by one.
    #[clap(long)]
    many: bool,
}

/// Queens of rows `i < k` are on different columns and diagonals.
fn not_attacking(ddm: &MddManager, n: usize, i: usize, k: usize) -> NodeId {
    let children: Vec<NodeId> = (0..n)
        .map(|a| {
            let row: Vec<NodeId> = (0..n)
                .map(|b| {
                    if a == b || a.abs_diff(b) == k - i {
                        ddm.leaf(0)
                    } else {
                        ddm.leaf(1)
                    }
                })
                .collect();
            ddm.make_node(Var::new(k as u32), &row)
        })
        .collect();
    ddm.make_node_consuming(Var::new(i as u32), &children)
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    simplelog::TermLogger::init(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let time_total = std::time::Instant::now();

    let args = Cli::parse();
    println!("args = {:?}", args);

    // Encode N-queens problem with one variable per row, valued by the column of its queen.
    let n = args.n;
    if n < 2 {
        color_eyre::eyre::bail!("need at least 2 queens, got {}", n);
    }
    let ddm = MddManager::builder()
        .variables((0..n).map(|i| format!("row{}", i)), n)
        .config(MddConfig::default().with_capacity(args.capacity))
        .build()?;
    println!("ddm = {:?}", ddm);

    let mut constraints = vec![];
    for k in 1..n {
        for i in 0..k {
            constraints.push(not_attacking(&ddm, n, i, k));
        }
    }
    println!("Total {} constraints", constraints.len());
    println!("ddm = {:?}", ddm);

    println!("Merging constraints...");
    let res = if args.many {
        And.combine_many(&ddm, &constraints)
    } else {
        let mut res = ddm.leaf(1);
        for &c in &constraints {
            let next = And.combine(&ddm, res, c);
            ddm.release(res);
            res = next;
        }
        res
    };
    for c in constraints {
        ddm.release(c);
    }
    println!("ddm = {:?}", ddm);
    println!("res of size {}", ddm.size(res));
    println!("solutions: {}", ddm.sat_count(res, ddm.leaf(1)));
    if let Some(solution) = ddm.one_sat(res, ddm.leaf(1)) {
        println!("first solution: {:?}", solution);
    }

    ddm.release(res);
    println!("ddm = {:?}", ddm);

    let time_total = time_total.elapsed();
    println!("Done in {:.3} s", time_total.as_secs_f64());

    Ok(())
}
