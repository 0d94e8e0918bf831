//! Interactive query loop.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use comfy_table::{presets, Table};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tensordb_query::{Executor, QueryOutput};
use tensordb_storage::TensorMetadata;

pub struct Repl {
    executor: Arc<Executor>,
    editor: DefaultEditor,
}

impl Repl {
    pub fn new(executor: Arc<Executor>) -> Result<Self> {
        Ok(Self {
            executor,
            editor: DefaultEditor::new()?,
        })
    }

    pub fn print_banner(&self, data_dir: &Path) {
        println!("TensorDB {}", env!("CARGO_PKG_VERSION"));
        println!("Store: {}", data_dir.display());
        println!("Type a query, or 'exit' to quit.");
        println!();
    }

    pub async fn run(&mut self) -> Result<()> {
        loop {
            match self.editor.readline("tensordb> ") {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
                        break;
                    }
                    self.editor.add_history_entry(line)?;
                    if let Err(e) = self.execute_and_print(line).await {
                        eprintln!("Error: {e}");
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(e) => return Err(e.into()),
            }
        }
        self.executor.close()?;
        Ok(())
    }

    pub async fn execute_and_print(&mut self, query: &str) -> Result<()> {
        match self.executor.execute_query(query).await {
            Ok(output) => {
                print_output(&output);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn print_output(output: &QueryOutput) {
    match output {
        QueryOutput::Status(status) => println!("{status}"),
        QueryOutput::Value(value) => {
            println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
        }
        QueryOutput::Batches(batches) => {
            println!("{}", serde_json::to_string_pretty(batches).unwrap_or_default());
        }
        QueryOutput::BatchSets(sets) => {
            println!("{}", serde_json::to_string_pretty(sets).unwrap_or_default());
        }
        QueryOutput::Listing(listing) => print_listing(listing),
    }
}

fn print_listing(listing: &[TensorMetadata]) {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_header(vec!["Name", "Shape", "Type", "Strides"]);
    for meta in listing {
        table.add_row(vec![
            meta.name.clone(),
            format!("{:?}", meta.shape),
            meta.data_type.to_string(),
            format!("{:?}", meta.strides),
        ]);
    }
    println!("{table}");
    println!("({} tensors)", listing.len());
}
