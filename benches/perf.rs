use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use nba_etl::extract::{RawTable, parse_table};
use nba_etl::transform::{STAT_COLUMNS, transform_at};

const ROWS: usize = 750;

fn sample_csv(rows: usize) -> String {
    let mut out = String::from("Player,Age,Team,Pos,Player-additional");
    for col in STAT_COLUMNS {
        out.push(',');
        out.push_str(col);
    }
    out.push('\n');
    for i in 0..rows {
        out.push_str(&format!("Player {i},{},T{},G,p{i:05}", 19 + i % 20, i % 30));
        for (j, col) in STAT_COLUMNS.iter().enumerate() {
            out.push(',');
            if *col == "Awards" {
                continue;
            }
            if (i + j) % 17 == 0 {
                out.push('-');
            } else {
                out.push_str(&format!("{}", (i * 7 + j) % 40));
            }
        }
        out.push('\n');
    }
    out
}

fn sample_table() -> RawTable {
    parse_table(&sample_csv(ROWS)).expect("valid sample csv")
}

fn bench_parse(c: &mut Criterion) {
    let csv = sample_csv(ROWS);
    c.bench_function("parse_table", |b| {
        b.iter(|| {
            let table = parse_table(black_box(&csv)).unwrap();
            black_box(table.len());
        })
    });
}

fn bench_transform(c: &mut Criterion) {
    let table = sample_table();
    c.bench_function("transform", |b| {
        b.iter(|| {
            let snap = transform_at(
                black_box(table.clone()),
                "2024-25",
                "2025-04-14T02:00:00+00:00".to_string(),
            )
            .unwrap();
            black_box(snap.players.len());
        })
    });
}

criterion_group!(benches, bench_parse, bench_transform);
criterion_main!(benches);
