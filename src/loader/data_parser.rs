use std::path::{Path, PathBuf};

use futures::future::join_all;
use log::{error, info};
use regex::Regex;
use tokio::sync::mpsc;

use super::csv_processor::{CsvTable, CsvTableBuilder, FILE_PATTERN};
use crate::api::err::{CredentialError, Result};

pub struct DataProducer {
    tx: mpsc::Sender<CsvTable>,
}

pub struct DataConsumer {
    rx: mpsc::Receiver<CsvTable>,
}

impl DataConsumer {
    pub fn new(rx: mpsc::Receiver<CsvTable>) -> Self {
        Self { rx }
    }

    /// Collects tables until every producer is gone, sorted by university
    /// name so registration order does not depend on file system order.
    pub async fn consume(&mut self) -> Vec<CsvTable> {
        let mut result = Vec::new();
        while let Some(table) = self.rx.recv().await {
            result.push(table);
        }
        result.sort_by(|a, b| a.university.cmp(&b.university));
        result
    }
}

impl DataProducer {
    pub fn new(tx: mpsc::Sender<CsvTable>) -> Self {
        Self { tx }
    }

    /// Parses every roster file under `path` on the blocking pool and sends
    /// the tables down the channel. Files that fail to parse are logged and
    /// skipped; returns how many tables were sent.
    pub async fn produce(&self, path: PathBuf) -> Result<usize> {
        let csv_files = collect_csv_files(&path)?;
        let mut tasks = Vec::with_capacity(csv_files.len());

        for csv_file in csv_files {
            let tx_clone = self.tx.clone();
            let task = tokio::spawn(async move {
                let parse_path = csv_file.clone();
                let table = tokio::task::spawn_blocking(move || {
                    CsvTableBuilder::new(&parse_path).build()
                })
                .await
                .map_err(|e| CredentialError::TaskError(e.to_string()))??;

                let message = format!("{} ({} rows)", table.university, table.rows.len());
                tx_clone
                    .send(table)
                    .await
                    .map_err(|_| CredentialError::TaskError("consumer dropped".to_string()))?;
                Ok::<String, CredentialError>(message)
            });
            tasks.push(task);
        }

        let mut sent = 0;
        for result in join_all(tasks).await {
            match result {
                Ok(Ok(message)) => {
                    sent += 1;
                    info!("parsed {}", message);
                }
                Ok(Err(e)) => error!("{}", e),
                Err(e) => error!("{:?}", e),
            }
        }
        Ok(sent)
    }
}

/// Reads every roster file in `dir` concurrently.
pub async fn load_directory(dir: PathBuf, capacity: usize) -> Result<Vec<CsvTable>> {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let producer = DataProducer::new(tx);
    let mut consumer = DataConsumer::new(rx);

    let producer_task = tokio::spawn(async move { producer.produce(dir).await });
    let tables = consumer.consume().await;
    producer_task
        .await
        .map_err(|e| CredentialError::TaskError(e.to_string()))??;
    Ok(tables)
}

fn collect_csv_files(dir_path: &Path) -> Result<Vec<PathBuf>> {
    let mut csv_files = Vec::new();
    let re = Regex::new(FILE_PATTERN)?;
    let files = std::fs::read_dir(dir_path)?;

    for entry in files.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Some(file_name) = entry.file_name().to_str() {
            if re.is_match(file_name) {
                csv_files.push(path);
            }
        }
    }

    csv_files.sort();
    Ok(csv_files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_roster(dir: &Path, file_name: &str, rows: &[&str]) {
        let mut content = String::from("student_id,name,program,score,graduation_year\n");
        for row in rows {
            content.push_str(row);
            content.push('\n');
        }
        fs::write(dir.join(file_name), content).unwrap();
    }

    #[test]
    fn test_collect_csv_files() {
        let temp_dir = tempdir().unwrap();
        let temp_path = temp_dir.path();

        fs::write(temp_path.join("MIT_students.csv"), "x").unwrap();
        fs::write(temp_path.join("readme.txt"), "x").unwrap();
        fs::write(temp_path.join("summary.csv"), "x").unwrap();
        fs::create_dir_all(temp_path.join("Nested_students.csv")).unwrap();

        let csv_files = collect_csv_files(temp_path).unwrap();
        assert_eq!(csv_files, vec![temp_path.join("MIT_students.csv")]);
    }

    #[test]
    fn test_collect_csv_files_missing_dir() {
        let result = collect_csv_files(Path::new("/definitely/not/here"));
        assert!(matches!(result, Err(CredentialError::FileReadError(_))));
    }

    #[tokio::test]
    async fn test_data_producer_consumer() {
        let temp_dir = tempdir().unwrap();
        let temp_path = temp_dir.path().to_path_buf();
        write_roster(&temp_path, "Stanford_University_students.csv", &[
            "STAN001,Charlie Brown,Data Science,3.95,2023",
            "STAN002,Eva Green,Machine Learning,3.78,2024",
        ]);
        write_roster(&temp_path, "MIT_students.csv", &["MIT001,Alice Johnson,CS,3.85,2023"]);
        // header without the required columns: skipped, not fatal
        fs::write(temp_path.join("Broken_students.csv"), "a,b\n1,2\n").unwrap();

        let tables = load_directory(temp_path, 1).await.unwrap();

        let names: Vec<&str> = tables.iter().map(|t| t.university.as_str()).collect();
        assert_eq!(names, vec!["MIT", "Stanford University"]);
        assert_eq!(tables[1].rows.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_directory() {
        let temp_dir = tempdir().unwrap();
        let tables = load_directory(temp_dir.path().to_path_buf(), 4).await.unwrap();
        assert!(tables.is_empty());
    }
}
