//! Client-side paginated campaign table with its page mirrored into a query
//! string. Arrow keys page, `s` cycles the spend sort, `/` filters to live
//! campaigns, `q` quits.

use bubbletea_rs::{quit, Cmd, KeyMsg, Model as BubbleTeaModel, Msg, Program};
use crossterm::event::KeyCode;
use datagrid_widgets::prelude::*;

struct Campaign {
    advertiser: String,
    status: &'static str,
    spend: f64,
}

impl Row for Campaign {
    fn fields() -> &'static [&'static str] {
        &["advertiser", "status", "spend"]
    }

    fn cell(&self, field: &str) -> CellValue {
        match field {
            "advertiser" => self.advertiser.as_str().into(),
            "status" => self.status.into(),
            "spend" => self.spend.into(),
            _ => CellValue::Null,
        }
    }
}

struct App {
    table: Table<Campaign>,
    location: MemoryLocation,
}

impl BubbleTeaModel for App {
    fn init() -> (Self, Option<Cmd>) {
        let columns = vec![
            Column::field("advertiser", "Advertiser").with_width(20),
            Column::field("status", "Status").with_width(8),
            Column::field("spend", "Spend").with_width(10),
        ];
        let mut table = match Table::new(columns, TableOptions::new().with_page_size(8)) {
            Ok(table) => table,
            Err(err) => panic!("invalid demo columns: {err}"),
        };
        let location = MemoryLocation::new("view=campaigns&page=2");
        table.attach_page_sync(PageSyncAdapter::new(location.clone()));
        table.set_rows(
            (1..=42)
                .map(|n| Campaign {
                    advertiser: format!("Advertiser {n}"),
                    status: if n % 3 == 0 { "paused" } else { "live" },
                    spend: (n * 37 % 500) as f64,
                })
                .collect(),
        );
        (Self { table, location }, None)
    }

    fn update(&mut self, msg: Msg) -> Option<Cmd> {
        if let Some(key) = msg.downcast_ref::<KeyMsg>() {
            match key.key {
                KeyCode::Char('q') | KeyCode::Esc => return Some(quit()),
                KeyCode::Char('s') => {
                    let _ = self.table.set_sort("spend", SortIntent::Toggle);
                }
                KeyCode::Char('/') => {
                    let unfiltered = self.table.state().column_filters.is_empty();
                    let _ = self
                        .table
                        .set_column_filter("status", if unfiltered { "live" } else { "" });
                }
                _ => self.table.update(&msg),
            }
        }
        None
    }

    fn view(&self) -> String {
        format!(
            "{}\n\n?{}\n←/→ page • s sort spend • / live only • q quit",
            self.table.view(),
            self.location.search()
        )
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let program = Program::<App>::builder().build()?;
    program.run().await?;
    Ok(())
}
