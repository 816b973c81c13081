use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::arbitrator::Arbitrator;
use crate::capture::SystemClock;
use crate::catalog::{element_identifier, ActionKind};
use crate::clipboard::{ClipboardWriter, WlCopyBackend};
use crate::config::{load_app_config, AppConfig};
use crate::dom::Document;
use crate::error::AppResult;
use crate::frame::{FrameAgent, LocalTab};
use crate::geometry::Point;
use crate::input::PointerInteraction;
use crate::palette::FlattenedActionList;
use crate::protocol::{FrameId, TabId};
use crate::resolve::resolve_chain;

#[derive(Debug, Parser)]
#[command(name = "dom-copier")]
#[command(about = "Copy text, markup or attributes of a page element")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Command {
    /// Print the actions offered for the element at a point
    Inspect {
        /// JSON page fixture
        fixture: PathBuf,
        x: f64,
        y: f64,
    },
    /// Open the palette at a point and copy one action through wl-copy
    Copy {
        /// JSON page fixture
        fixture: PathBuf,
        x: f64,
        y: f64,
        /// Position of the action in the flattened list
        index: usize,
    },
}

#[derive(Debug, Serialize)]
pub struct InspectReport {
    pub groups: Vec<GroupReport>,
}

#[derive(Debug, Serialize)]
pub struct GroupReport {
    pub element: String,
    pub actions: Vec<ActionReport>,
}

#[derive(Debug, Serialize)]
pub struct ActionReport {
    pub index: usize,
    pub label: String,
    pub preview: String,
}

#[derive(Debug, Serialize)]
pub struct CopyReport {
    pub element: String,
    pub action: String,
    pub payload: String,
    pub copied: bool,
}

/// Lists the actions offered for the element under `point`.
pub fn inspect(page: &Document, point: Point, config: &AppConfig) -> AppResult<InspectReport> {
    let chain = resolve_chain(page, point)?;
    let list = FlattenedActionList::build(page, &chain, &config.palette);
    let groups = list
        .groups()
        .iter()
        .map(|group| GroupReport {
            element: group.label.clone(),
            actions: (group.start..group.end())
                .filter_map(|index| list.get(index).map(|item| (index, item)))
                .map(|(index, item)| ActionReport {
                    index,
                    label: item.action.label.clone(),
                    preview: item.action.preview.clone(),
                })
                .collect(),
        })
        .collect();
    Ok(InspectReport { groups })
}

/// Drives the whole flow on a single-frame tab: capture, election, open,
/// then activation of item `index`.
pub async fn copy(
    page: Document,
    point: Point,
    index: usize,
    config: &AppConfig,
    clipboard: ClipboardWriter,
) -> anyhow::Result<CopyReport> {
    let frame_id = FrameId(0);
    let tab_id = TabId(0);
    let mut tab = LocalTab::new(tab_id);
    let frame = tab.attach(FrameAgent::new(
        frame_id,
        page,
        config,
        clipboard,
        Arc::new(SystemClock),
    ));
    frame
        .lock()
        .await
        .on_pointer(PointerInteraction::context_menu(point));

    let tab = Arc::new(tab);
    let arbitrator = Arbitrator::new(tab.clone(), tab, config.frame_query_timeout());
    let (_, response) = arbitrator.run(tab_id).await?;
    if !response.opened {
        bail!(
            "palette did not open: {}",
            response.reason.as_deref().unwrap_or("unknown")
        );
    }

    let mut agent = frame.lock().await;
    let outcome = agent
        .activate(index)
        .await
        .ok_or_else(|| anyhow!("no action at index {index}"))?;
    let element = element_identifier(agent.page(), outcome.element, &config.palette);
    Ok(CopyReport {
        element,
        action: action_name(outcome.kind).to_string(),
        payload: outcome.payload,
        copied: outcome.copied,
    })
}

fn action_name(kind: ActionKind) -> &'static str {
    match kind {
        ActionKind::CollapsedText => "collapsed-text",
        ActionKind::TrimmedText => "trimmed-text",
        ActionKind::RawText => "raw-text",
        ActionKind::InnerMarkup => "inner-html",
        ActionKind::OuterMarkup => "outer-html",
        ActionKind::Attribute => "attribute",
    }
}

pub fn execute(command: Command) -> anyhow::Result<()> {
    let config = load_app_config();
    match command {
        Command::Inspect { fixture, x, y } => {
            let page = Document::load_fixture(&fixture)?;
            let report = inspect(&page, Point::new(x, y), &config)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Copy {
            fixture,
            x,
            y,
            index,
        } => {
            let page = Document::load_fixture(&fixture)?;
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()
                .context("failed to start runtime")?;
            let clipboard = ClipboardWriter::new().with_strategy(WlCopyBackend::new());
            let report = runtime.block_on(copy(page, Point::new(x, y), index, &config, clipboard))?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}
