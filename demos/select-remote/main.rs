//! Infinite-scroll advertiser picker backed by a slow fake API. Pages arrive
//! after a short delay; scrolling near the end of the popover loads the next
//! one until the API runs dry.

use std::time::Duration;

use bubbletea_rs::{quit, Cmd, KeyMsg, Model as BubbleTeaModel, Msg, Program};
use crossterm::event::KeyCode;
use datagrid_widgets::prelude::*;
use datagrid_widgets::spinner;

const PAGE_SIZE: usize = 15;
const PAGES: u32 = 4;

async fn fetch_advertisers(page: u32) -> Result<Vec<OptionItem>, FetchError> {
    tokio::time::sleep(Duration::from_millis(400)).await;
    if page > PAGES {
        return Ok(Vec::new());
    }
    Ok((0..PAGE_SIZE)
        .map(|i| {
            let n = (page as usize - 1) * PAGE_SIZE + i + 1;
            OptionItem::new(n.to_string(), format!("Advertiser {n:03}"))
        })
        .collect())
}

struct App {
    select: Select,
}

impl BubbleTeaModel for App {
    fn init() -> (Self, Option<Cmd>) {
        let mut select = Select::new(
            fetch_advertisers,
            SelectOptions::default()
                .with_placeholder("Pick an advertiser…")
                .with_popup_height(10),
        )
        .with_spinner(spinner::DOT.clone());
        let cmd = select.open();
        (Self { select }, cmd)
    }

    fn update(&mut self, msg: Msg) -> Option<Cmd> {
        if let Some(key) = msg.downcast_ref::<KeyMsg>() {
            if !self.select.is_open() && matches!(key.key, KeyCode::Char('q') | KeyCode::Esc) {
                return Some(quit());
            }
        }
        self.select.update(&msg)
    }

    fn view(&self) -> String {
        let help = if self.select.is_open() {
            self.select.help_view()
        } else {
            "enter open • q quit".to_string()
        };
        format!("{}\n\n{}", self.select.view(), help)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let program = Program::<App>::builder().build()?;
    program.run().await?;
    Ok(())
}
