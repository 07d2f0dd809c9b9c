use std::error::Error;

use credential_validator::{
    config::Config, loader, logger, report, LoadRecord, MinimumScore, University,
    ValidationSystem,
};
use log::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = Config::from_env()?;
    logger::init(&config)?;

    let mut system = match config.min_score {
        Some(min) => ValidationSystem::with_policy(Box::new(MinimumScore(min))),
        None => ValidationSystem::new(),
    };

    // load rosters before anything is queued
    if config.data_dir.is_dir() {
        let tables = loader::data_parser::load_directory(
            config.data_dir.clone(),
            config.channel_capacity,
        )
        .await?;
        let report = loader::apply_tables(&mut system, tables);
        info!(
            "loaded {} students, {} rejected",
            report.added,
            report.rejected.len()
        );
    }
    if system.total_students() == 0 {
        warn!(
            "no rosters under {}, using the demo roster",
            config.data_dir.display()
        );
        seed_demo(&mut system)?;
    }

    system.request_validation("MIT001", "Google Inc.")?;
    system.request_validation("STAN002", "Microsoft")?;
    system.request_validation("BERK001", "Amazon")?;
    system.request_validation("MIT999", "Meta")?;
    system.request_validation("HARV001", "Apple")?;
    system.request_validations_bulk(["STAN001", "MIT002", "BERK002", "HARV003"], "Tesla")?;

    let batch = system.process_all();
    info!(
        "batch: {}/{} valid ({:.1}%), avg {:?} per request, {:.1} req/s",
        batch.valid,
        batch.processed,
        batch.success_rate() * 100.0,
        batch.average_latency(),
        batch.throughput()
    );
    for result in system.results() {
        match &result.student {
            Some(student) => info!(
                "{} {} VALID: {} ({}, {}, {:.2}, {}) from {}",
                result.request_id,
                result.student_id,
                student.name(),
                result.university.as_deref().unwrap_or("?"),
                student.program(),
                student.score(),
                student.graduation_year(),
                result.organization
            ),
            None => info!(
                "{} {} {} from {}",
                result.request_id, result.student_id, result.outcome, result.organization
            ),
        }
    }

    for university in system.universities() {
        let stats = university.statistics(config.recent_year);
        info!(
            "{}: {} students, mean {:.2}, median {:.2}, {} programs, {} recent graduates",
            university.name(),
            stats.total_students,
            stats.average_score,
            stats.median_score,
            stats.programs_offered,
            stats.recent_graduates
        );
        for (rank, student) in university
            .top_students(report::TOP_STUDENTS)
            .into_iter()
            .enumerate()
        {
            info!(
                "  #{} {} {} ({}, {:.2})",
                rank + 1,
                student.id(),
                student.name(),
                student.program(),
                student.score()
            );
        }
    }

    let writer = report::ReportWriter::new(&config.report_dir)?;
    writer.write_all(&system, config.recent_year)?;
    writer.write_rosters(&system)?;

    Ok(())
}

fn seed_demo(system: &mut ValidationSystem) -> Result<(), Box<dyn Error>> {
    let roster: [(&str, &str, &str, &str, f64, u16); 13] = [
        ("MIT", "MIT001", "Alice Johnson", "Computer Science", 3.85, 2023),
        ("MIT", "MIT002", "Bob Smith", "Electrical Engineering", 3.62, 2024),
        ("MIT", "MIT003", "Carol White", "Mechanical Engineering", 3.91, 2023),
        ("Stanford University", "STAN001", "Charlie Brown", "Data Science", 3.95, 2023),
        ("Stanford University", "STAN002", "Eva Green", "Machine Learning", 3.78, 2024),
        ("Stanford University", "STAN003", "Frank Miller", "Artificial Intelligence", 3.88, 2023),
        ("Stanford University", "STAN004", "Helen Troy", "Data Science", 3.72, 2024),
        ("UC Berkeley", "BERK001", "Diana Prince", "Cybersecurity", 3.96, 2024),
        ("UC Berkeley", "BERK002", "Grace Hopper", "Software Engineering", 4.00, 2023),
        ("UC Berkeley", "BERK003", "Isaac Newton", "Computer Science", 3.89, 2024),
        ("Harvard University", "HARV001", "Jane Doe", "Computer Science", 3.81, 2023),
        ("Harvard University", "HARV002", "John Smith", "Information Technology", 3.68, 2024),
        ("Harvard University", "HARV003", "Maria Garcia", "Data Analytics", 3.92, 2024),
    ];

    for name in ["MIT", "Stanford University", "UC Berkeley", "Harvard University"] {
        if system.university(name).is_none() {
            system.register_university(University::new(name)?)?;
        }
    }
    system.load_records(roster.iter().map(
        |&(university, student_id, name, program, score, graduation_year)| LoadRecord {
            university: university.to_string(),
            student_id: student_id.to_string(),
            name: name.to_string(),
            program: program.to_string(),
            score,
            graduation_year,
            enrollment_date: None,
        },
    ));
    Ok(())
}
