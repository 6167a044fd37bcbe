//! 汇总与报告渲染基准测试
//!
//! 测试结论计算、内容扫描和报告渲染的性能

use app_vitals::config::CheckTarget;
use app_vitals::health::aggregator::assess;
use app_vitals::health::content::ContentMarkers;
use app_vitals::health::result::{
    CheckOutcomes, Functionality, FunctionalityOutcome, HealthReport, HttpOutcome, PodDetail,
    PodStatusOutcome,
};
use app_vitals::report;
use chrono::Utc;
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use std::time::Duration;
use uuid::Uuid;

fn sample_checks() -> CheckOutcomes {
    CheckOutcomes {
        http_connectivity: HttpOutcome::responded(200, 6.2),
        functionality: FunctionalityOutcome {
            http_status: Some(200),
            response_size: Some(512),
            content_type: Some("text/html".to_string()),
            fortune_detected: Some(true),
            cow_detected: Some(false),
            html_format_detected: Some(true),
            functionality: Functionality::Degraded,
            error: None,
        },
        pod_status: Some(PodStatusOutcome::from_details(
            (0..10)
                .map(|i| PodDetail {
                    name: format!("wisecow-{i}"),
                    phase: "Running".to_string(),
                    ready: i % 3 != 0,
                })
                .collect(),
        )),
    }
}

/// 汇总基准测试
fn aggregator_benchmark(c: &mut Criterion) {
    let checks = sample_checks();

    c.bench_function("assess", |b| {
        b.iter(|| black_box(assess(black_box(true), black_box(&checks))));
    });

    let body = "<pre>".to_string() + &"Fortune says the cow goes moo. ".repeat(200) + "</pre>";
    c.bench_function("content_marker_scan", |b| {
        b.iter(|| black_box(ContentMarkers::scan(black_box(&body))));
    });
}

/// 报告渲染基准测试
fn report_benchmark(c: &mut Criterion) {
    let checks = sample_checks();
    let assessment = assess(true, &checks);
    let report = HealthReport {
        run_id: Uuid::new_v4(),
        timestamp: Utc::now(),
        target: CheckTarget::new("http://localhost:4499", Duration::from_secs(10))
            .with_orchestrator("default", "wisecow"),
        checks,
        overall_health: assessment.verdict,
        recommendations: assessment.recommendations,
    };

    c.bench_function("render_text", |b| {
        b.iter(|| black_box(report::render_text(black_box(&report))));
    });

    c.bench_function("render_json", |b| {
        b.iter(|| black_box(report::render_json(black_box(&report)).unwrap()));
    });
}

criterion_group!(benches, aggregator_benchmark, report_benchmark);
criterion_main!(benches);
