// TUI module for rendering the terminal interface
pub mod colors;
pub mod helpers;
pub mod input;

// Re-exports
pub use colors::*;
pub use helpers::{calculate_progress, format_file_size, truncate_filename};
pub use input::{handle_confirm_input, handle_key_event, handle_result_input, KeyAction};

use crate::domain::{CommitResult, FolderTree, Highlight, NodeId, SortSession};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Gauge, Paragraph, Wrap},
    Frame,
};
use std::collections::HashMap;
use std::path::Path;

const FOLDER_NAME_WIDTH: usize = 20;
const PENDING_NAME_WIDTH: usize = 18;

/// UI view state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    /// Main sorting view
    Browsing,
    /// Help overlay visible
    Help,
    /// Welcome screen shown on first launch
    Welcome,
    /// Asking before copying every pending image
    ConfirmCommit,
    /// Asking before dropping every pending move
    ConfirmClear,
    /// A commit is running in the background
    Committing,
    /// Outcome of the last commit
    CommitResult(CommitResult),
}

/// Per-frame details the session does not own
#[derive(Debug, Clone, Default)]
pub struct FrameInfo {
    /// Pixel size of the selected image, when it could be read.
    pub dimensions: Option<(u32, u32)>,
    /// One-off message for the status bar.
    pub notice: Option<String>,
    pub loading_tree: bool,
    pub dry_run: bool,
}

/// Renders the main screen and the overlay for `view`
pub fn render_view(frame: &mut Frame, session: &SortSession, view: &ViewState, info: &FrameInfo) {
    render(frame, session, info);

    let pending = session.pending().len();
    match view {
        ViewState::Browsing => {}
        ViewState::Help => render_help_overlay(frame),
        ViewState::Welcome => render_welcome_overlay(frame),
        ViewState::ConfirmCommit => render_confirm_commit_overlay(frame, pending, info.dry_run),
        ViewState::ConfirmClear => render_confirm_clear_overlay(frame, pending),
        ViewState::Committing => render_committing_overlay(frame, pending),
        ViewState::CommitResult(result) => {
            render_commit_result_overlay(frame, result, info.notice.as_deref())
        }
    }
}

/// Renders the main screen
pub fn render(frame: &mut Frame, session: &SortSession, info: &FrameInfo) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Header with progress
            Constraint::Min(0),    // Images, folders, pending
            Constraint::Length(4), // Sequence and messages
            Constraint::Length(3), // Footer
        ])
        .split(frame.area());

    render_header(frame, chunks[0], session, info);
    render_body(frame, chunks[1], session, info);
    render_status(frame, chunks[2], session, info);
    render_footer(frame, chunks[3]);
}

fn render_header(frame: &mut Frame, area: Rect, session: &SortSession, info: &FrameInfo) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Length(2)])
        .split(area);

    let state = session.images();
    let (title_text, mut image_info) = if let Some(image) = session.current_image() {
        let details = match info.dimensions {
            Some((w, h)) => format!("({} • {}×{})", format_file_size(image.size), w, h),
            None => format!("({})", format_file_size(image.size)),
        };
        (
            format!(" Image {}/{} ", state.current_index + 1, state.images.len()),
            vec![
                Span::styled(
                    image.name.clone(),
                    Style::default()
                        .fg(TEXT_PRIMARY)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw("  "),
                Span::styled(details, Style::default().fg(TEXT_SECONDARY)),
            ],
        )
    } else {
        (
            " Digisort ".to_string(),
            vec![Span::styled(
                "No images to sort",
                Style::default().fg(TEXT_SECONDARY),
            )],
        )
    };

    if info.dry_run {
        image_info.push(Span::styled(
            "  [DRY RUN]",
            Style::default()
                .fg(ACCENT_PING)
                .add_modifier(Modifier::BOLD),
        ));
    }

    let title_line = Line::from(vec![Span::styled(
        title_text,
        Style::default()
            .fg(ACCENT_HIGHLIGHT)
            .add_modifier(Modifier::BOLD),
    )]);

    let header = Paragraph::new(vec![title_line, Line::from(image_info)])
        .block(
            Block::default()
                .borders(Borders::TOP | Borders::LEFT | Borders::RIGHT)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(BORDER_COLOR)),
        )
        .alignment(Alignment::Left);

    frame.render_widget(header, chunks[0]);

    // Share of images with a pending destination
    let total = state.images.len();
    let assigned = session.pending().len();
    let progress = calculate_progress(assigned, total);

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::BOTTOM | Borders::LEFT | Borders::RIGHT)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(BORDER_COLOR)),
        )
        .gauge_style(Style::default().fg(ACCENT_SECONDARY).bg(BG_DARK))
        .ratio(progress)
        .label(format!(
            "{}% ({}/{} assigned)",
            (progress * 100.0) as u16,
            assigned,
            total
        ));

    frame.render_widget(gauge, chunks[1]);
}

fn render_body(frame: &mut Frame, area: Rect, session: &SortSession, info: &FrameInfo) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(28),
            Constraint::Percentage(42),
            Constraint::Percentage(30),
        ])
        .split(area);

    render_image_list(frame, columns[0], session);
    render_folder_tree(frame, columns[1], session, info);
    render_pending_list(frame, columns[2], session);
}

fn panel(title: String) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER_COLOR))
        .title(title)
}

/// First row to draw so that `selected` stays inside a window of `height` rows
fn scroll_offset(selected: usize, height: usize) -> usize {
    (selected + 1).saturating_sub(height.max(1))
}

fn render_image_list(frame: &mut Frame, area: Rect, session: &SortSession) {
    let state = session.images();
    if state.images.is_empty() {
        frame.render_widget(render_empty_state_widget(), area);
        return;
    }

    let height = area.height.saturating_sub(2) as usize;
    let name_width = (area.width.saturating_sub(4) as usize).max(8);
    let offset = scroll_offset(state.current_index, height);

    let lines: Vec<Line> = state
        .images
        .iter()
        .enumerate()
        .skip(offset)
        .take(height.max(1))
        .map(|(i, image)| {
            let marker = if session.pending().contains(&image.path) {
                Span::styled("✓ ", Style::default().fg(ACCENT_SECONDARY))
            } else {
                Span::raw("  ")
            };
            let style = if i == state.current_index {
                Style::default()
                    .fg(TEXT_PRIMARY)
                    .bg(BG_SELECTED)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(TEXT_SECONDARY)
            };
            Line::from(vec![
                marker,
                Span::styled(truncate_filename(&image.name, name_width), style),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(panel(" Images ".to_string())), area);
}

fn render_folder_tree(frame: &mut Frame, area: Rect, session: &SortSession, info: &FrameInfo) {
    let Some(tree) = session.tree() else {
        let message = if info.loading_tree {
            "Loading folders..."
        } else {
            "No destination loaded"
        };
        let paragraph = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(message, Style::default().fg(TEXT_SECONDARY))),
        ])
        .alignment(Alignment::Center)
        .block(panel(" Folders ".to_string()));
        frame.render_widget(paragraph, area);
        return;
    };

    let title = format!(" Folders: {} ", tree.root().name);
    if tree.child_count(FolderTree::ROOT) == 0 {
        let paragraph = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "No subfolders found",
                Style::default().fg(TEXT_SECONDARY),
            )),
            Line::from(Span::styled(
                "Create folders in the destination and press r",
                Style::default().fg(TEXT_SECONDARY),
            )),
        ])
        .alignment(Alignment::Center)
        .block(panel(title));
        frame.render_widget(paragraph, area);
        return;
    }

    let mut counts: HashMap<&Path, usize> = HashMap::new();
    for mv in session.pending().values() {
        *counts.entry(mv.target_folder_path.as_path()).or_default() += 1;
    }

    let rows = tree.depth_first();
    let focus = rows
        .iter()
        .position(|&(id, _)| session.highlight(id) != Highlight::None)
        .unwrap_or(0);
    let height = area.height.saturating_sub(2) as usize;
    let offset = scroll_offset(focus, height);

    let lines: Vec<Line> = rows
        .iter()
        .map(|&(id, depth)| {
            let count = counts.get(tree.node(id).path.as_path()).copied();
            folder_line(session, tree, id, depth, count)
        })
        .collect();

    let paragraph = Paragraph::new(lines)
        .block(panel(title))
        .scroll((offset as u16, 0));
    frame.render_widget(paragraph, area);
}

fn folder_line<'a>(
    session: &SortSession,
    tree: &FolderTree,
    id: NodeId,
    depth: usize,
    pending_count: Option<usize>,
) -> Line<'a> {
    let node = tree.node(id);
    let style = match session.highlight(id) {
        Highlight::Pinged => Style::default()
            .fg(BG_DARK)
            .bg(ACCENT_PING)
            .add_modifier(Modifier::BOLD),
        Highlight::Exact => Style::default()
            .fg(ACCENT_HIGHLIGHT)
            .add_modifier(Modifier::BOLD),
        Highlight::TargetWithZero => Style::default()
            .fg(ACCENT_SECONDARY)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        Highlight::Prefix => Style::default().fg(ACCENT_HIGHLIGHT),
        Highlight::None => Style::default().fg(TEXT_PRIMARY),
    };

    let mut spans = vec![
        Span::raw("  ".repeat(depth)),
        Span::styled(
            format!("[{}] ", tree.sequence_label(id)),
            Style::default().fg(TEXT_SECONDARY),
        ),
        Span::styled(truncate_filename(&node.name, FOLDER_NAME_WIDTH), style),
    ];
    if let Some(n) = pending_count {
        spans.push(Span::styled(
            format!(" ({})", n),
            Style::default().fg(ACCENT_SECONDARY),
        ));
    }
    Line::from(spans)
}

fn render_pending_list(frame: &mut Frame, area: Rect, session: &SortSession) {
    let pending = session.pending();
    let title = format!(" Pending ({}) ", pending.len());

    if pending.is_empty() {
        let paragraph = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "No images assigned yet",
                Style::default().fg(TEXT_SECONDARY),
            )),
        ])
        .alignment(Alignment::Center)
        .block(panel(title));
        frame.render_widget(paragraph, area);
        return;
    }

    let lines: Vec<Line> = pending
        .values()
        .map(|mv| {
            let target = match session.tree() {
                Some(tree) => tree.relative_label(&mv.target_folder_path),
                None => mv.target_folder_path.display().to_string(),
            };
            Line::from(vec![
                Span::styled(
                    truncate_filename(&mv.image_label, PENDING_NAME_WIDTH),
                    Style::default().fg(TEXT_PRIMARY),
                ),
                Span::styled(" → ", Style::default().fg(TEXT_SECONDARY)),
                Span::styled(target, Style::default().fg(ACCENT_SECONDARY)),
            ])
        })
        .collect();

    // Newest entries stay visible
    let height = area.height.saturating_sub(2) as usize;
    let offset = lines.len().saturating_sub(height.max(1));

    let paragraph = Paragraph::new(lines)
        .block(panel(title))
        .scroll((offset as u16, 0));
    frame.render_widget(paragraph, area);
}

fn render_status(frame: &mut Frame, area: Rect, session: &SortSession, info: &FrameInfo) {
    let buffer = session.buffer();
    let sequence = if buffer.is_empty() {
        Span::styled("_", Style::default().fg(TEXT_SECONDARY))
    } else {
        Span::styled(
            buffer.to_string(),
            Style::default()
                .fg(ACCENT_HIGHLIGHT)
                .add_modifier(Modifier::BOLD),
        )
    };
    let auto_advance = if session.auto_advance() { "on" } else { "off" };

    let first = Line::from(vec![
        Span::styled(" Sequence: ", Style::default().fg(TEXT_SECONDARY)),
        sequence,
        Span::raw("  │  "),
        Span::styled("Auto-advance: ", Style::default().fg(TEXT_SECONDARY)),
        Span::styled(auto_advance, Style::default().fg(TEXT_PRIMARY)),
    ]);

    let second = if let Some(err) = session.error() {
        Line::from(Span::styled(
            format!(" {}", err.error),
            Style::default()
                .fg(ACCENT_PRIMARY)
                .add_modifier(Modifier::BOLD),
        ))
    } else if let Some(notice) = &info.notice {
        Line::from(Span::styled(
            format!(" {}", notice),
            Style::default().fg(TEXT_SECONDARY),
        ))
    } else {
        Line::from("")
    };

    let status = Paragraph::new(vec![first, second]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(BORDER_COLOR)),
    );
    frame.render_widget(status, area);
}

fn render_footer(frame: &mut Frame, area: Rect) {
    let key = |k: &'static str| {
        Span::styled(
            k,
            Style::default()
                .fg(ACCENT_HIGHLIGHT)
                .add_modifier(Modifier::BOLD),
        )
    };
    let label = |l: &'static str| Span::styled(l, Style::default().fg(TEXT_SECONDARY));

    let controls = Line::from(vec![
        key("0-9 "),
        label("Folder"),
        Span::raw("  │  "),
        key("↑↓ "),
        label("Navigate"),
        Span::raw("  │  "),
        key("x "),
        label("Remove"),
        Span::raw("  │  "),
        key("c "),
        label("Commit"),
        Span::raw("  │  "),
        key("? "),
        label("Help"),
        Span::raw("  │  "),
        key("q "),
        label("Quit"),
    ]);

    let footer = Paragraph::new(controls)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(BORDER_COLOR)),
        )
        .alignment(Alignment::Center);

    frame.render_widget(footer, area);
}

/// Creates an empty state widget for when no images are present
fn render_empty_state_widget() -> Paragraph<'static> {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "No Images Found",
            Style::default()
                .fg(ACCENT_HIGHLIGHT)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Supported: jpg png gif bmp webp tiff svg",
            Style::default().fg(TEXT_SECONDARY),
        )),
    ];

    Paragraph::new(lines)
        .block(panel(" Images ".to_string()))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
}

fn overlay_block(title: &'static str, accent: ratatui::style::Color) -> Block<'static> {
    Block::default()
        .title(title)
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(accent))
        .style(Style::default().bg(BG_DARK))
}

fn shortcut_line(keys: &'static str, text: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<10}", keys), Style::default().fg(ACCENT_HIGHLIGHT)),
        Span::raw(text),
    ])
}

/// Renders the help overlay
pub fn render_help_overlay(frame: &mut Frame) {
    let help_area = centered_rect(60, 80, frame.area());
    frame.render_widget(Clear, help_area);

    let block = overlay_block(" Help ", ACCENT_HIGHLIGHT);
    let inner = block.inner(help_area);
    frame.render_widget(block, help_area);

    let help_lines = vec![
        Line::from(Span::styled(
            "Keyboard Shortcuts",
            Style::default()
                .fg(ACCENT_HIGHLIGHT)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        shortcut_line("1-9", "Descend into the n-th subfolder"),
        shortcut_line("0", "Stop at the folder reached so far"),
        shortcut_line("Enter", "Use the typed sequence now"),
        shortcut_line("↑↓ / k j", "Previous / next image"),
        shortcut_line("x / Del", "Remove this image's pending move"),
        shortcut_line("X", "Clear all pending moves"),
        shortcut_line("c", "Copy all pending images"),
        shortcut_line("a", "Toggle auto-advance"),
        shortcut_line("o", "Open image in viewer"),
        shortcut_line("r", "Reload destination folders"),
        shortcut_line("q / Esc", "Quit"),
        Line::from(""),
        Line::from(Span::styled(
            "An ambiguous sequence resolves after a short pause.",
            Style::default().fg(TEXT_SECONDARY),
        )),
        Line::from(Span::styled(
            "Press ? or Esc to close",
            Style::default().fg(TEXT_SECONDARY),
        )),
    ];

    let paragraph = Paragraph::new(help_lines)
        .alignment(Alignment::Left)
        .style(Style::default().fg(TEXT_PRIMARY));

    frame.render_widget(paragraph, inner);
}

/// Renders the welcome dialog overlay
pub fn render_welcome_overlay(frame: &mut Frame) {
    let area = centered_rect(80, 80, frame.area());
    frame.render_widget(Clear, area);

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let heading = Style::default()
        .fg(ACCENT_HIGHLIGHT)
        .add_modifier(Modifier::BOLD);
    let step = |n: &'static str| Span::styled(n, Style::default().fg(TEXT_SECONDARY));

    let welcome_lines = vec![
        Line::from(""),
        Line::from(Span::styled("Welcome to digisort!", heading)),
        Line::from(""),
        Line::from("Every subfolder of the destination is numbered under its parent."),
        Line::from("Type the numbers along the path to a folder to send the current image there."),
        Line::from(""),
        Line::from(Span::styled("Quick Start:", heading)),
        Line::from(""),
        Line::from(vec![
            step("  1. "),
            Span::raw("Press "),
            Span::styled("2", bold),
            Span::raw(" for the second folder, "),
            Span::styled("21", bold),
            Span::raw(" for its first subfolder"),
        ]),
        Line::from(vec![
            step("  2. "),
            Span::raw("End with "),
            Span::styled("0", bold),
            Span::raw(" to stop at a folder that has subfolders, or just pause"),
        ]),
        Line::from(vec![
            step("  3. "),
            Span::raw("Press "),
            Span::styled("c", bold),
            Span::raw(" to copy every assigned image into its folder"),
        ]),
        Line::from(""),
        Line::from(Span::styled("Good to know:", heading)),
        Line::from(""),
        Line::from(vec![
            Span::styled("  •  ", Style::default().fg(ACCENT_SECONDARY)),
            Span::raw("Images are copied, the originals stay where they are"),
        ]),
        Line::from(vec![
            Span::styled("  •  ", Style::default().fg(ACCENT_SECONDARY)),
            Span::raw("Assigning an image again replaces its earlier choice"),
        ]),
        Line::from(vec![
            Span::styled("  •  ", Style::default().fg(ACCENT_SECONDARY)),
            Span::raw("Run with "),
            Span::styled("--dry-run", bold),
            Span::raw(" to try it without writing files"),
        ]),
        Line::from(""),
        Line::from(Span::styled("Press any key to start sorting...", heading)),
    ];

    let welcome_text = Paragraph::new(welcome_lines)
        .block(overlay_block(" Welcome to digisort ", ACCENT_HIGHLIGHT))
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: false });

    frame.render_widget(welcome_text, area);
}

fn confirm_keys_line() -> Line<'static> {
    Line::from(vec![
        Span::styled("[Y]", Style::default().fg(ACCENT_SECONDARY)),
        Span::raw("es  "),
        Span::styled("[Enter]", Style::default().fg(ACCENT_SECONDARY)),
        Span::raw("     "),
        Span::styled("[N]", Style::default().fg(ACCENT_PRIMARY)),
        Span::raw("o  "),
        Span::styled("[Esc]", Style::default().fg(ACCENT_PRIMARY)),
    ])
}

/// Renders the confirmation dialog before a commit
pub fn render_confirm_commit_overlay(frame: &mut Frame, pending: usize, dry_run: bool) {
    let confirm_area = centered_rect(50, 40, frame.area());
    frame.render_widget(Clear, confirm_area);

    let block = overlay_block(" Confirm Copy ", ACCENT_SECONDARY);
    let inner = block.inner(confirm_area);
    frame.render_widget(block, confirm_area);

    let note = if dry_run {
        "Dry run: nothing will be written."
    } else {
        "Existing files with the same name are replaced."
    };

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("Copy {} pending image(s)?", pending),
            Style::default()
                .fg(TEXT_PRIMARY)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(note, Style::default().fg(TEXT_SECONDARY))),
        Line::from(""),
        confirm_keys_line(),
    ];

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .style(Style::default().fg(TEXT_PRIMARY));
    frame.render_widget(paragraph, inner);
}

/// Renders the confirmation dialog before clearing every pending move
pub fn render_confirm_clear_overlay(frame: &mut Frame, pending: usize) {
    let confirm_area = centered_rect(50, 40, frame.area());
    frame.render_widget(Clear, confirm_area);

    let block = overlay_block(" ⚠ Clear Pending ", ACCENT_PRIMARY);
    let inner = block.inner(confirm_area);
    frame.render_widget(block, confirm_area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("Drop all {} pending move(s)?", pending),
            Style::default()
                .fg(TEXT_PRIMARY)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "No files are touched.",
            Style::default().fg(TEXT_SECONDARY),
        )),
        Line::from(""),
        confirm_keys_line(),
    ];

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .style(Style::default().fg(TEXT_PRIMARY));
    frame.render_widget(paragraph, inner);
}

/// Renders the overlay shown while a commit runs
pub fn render_committing_overlay(frame: &mut Frame, pending: usize) {
    let area = centered_rect(40, 30, frame.area());
    frame.render_widget(Clear, area);

    let block = overlay_block(" Copying ", ACCENT_HIGHLIGHT);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Simple animation based on current time
    let spinners = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    let spinner = spinners[(now / 100) as usize % spinners.len()];

    let lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled(format!("{} ", spinner), Style::default().fg(ACCENT_HIGHLIGHT)),
            Span::styled(
                format!("Copying {} image(s)", pending),
                Style::default().fg(TEXT_PRIMARY),
            ),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "Please wait...",
            Style::default()
                .fg(TEXT_SECONDARY)
                .add_modifier(Modifier::ITALIC),
        )),
    ];

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}

/// Renders the outcome of a commit
pub fn render_commit_result_overlay(frame: &mut Frame, result: &CommitResult, notice: Option<&str>) {
    let area = centered_rect(70, 60, frame.area());
    frame.render_widget(Clear, area);

    let accent = if result.overall_success {
        ACCENT_SECONDARY
    } else {
        ACCENT_PRIMARY
    };
    let block = overlay_block(" Copy Result ", accent);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            result.headline(),
            Style::default().fg(accent).add_modifier(Modifier::BOLD),
        )),
    ];

    // The all-failed detail repeats the failure lines listed below
    if result.succeeded_count > 0 || result.failed_entries.is_empty() {
        if let Some(detail) = result.detail() {
            lines.push(Line::from(Span::styled(
                detail,
                Style::default().fg(TEXT_SECONDARY),
            )));
        }
    }

    if !result.failed_entries.is_empty() {
        lines.push(Line::from(""));
        for entry in &result.failed_entries {
            lines.push(Line::from(Span::styled(
                entry.clone(),
                Style::default().fg(ACCENT_PRIMARY),
            )));
        }
    }

    lines.push(Line::from(""));
    if let Some(notice) = notice {
        lines.push(Line::from(Span::styled(
            notice.to_string(),
            Style::default().fg(ACCENT_HIGHLIGHT),
        )));
    }
    let hint = if result.failed_entries.is_empty() {
        "Press any key to continue"
    } else {
        "y: copy failures to clipboard   any other key: continue"
    };
    lines.push(Line::from(Span::styled(
        hint,
        Style::default().fg(TEXT_SECONDARY),
    )));

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .style(Style::default().fg(TEXT_PRIMARY))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, inner);
}

/// Helper to create a centered rect
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::commit::test_support::ScriptedCopier;
    use crate::domain::folder_tree::test_support::nested_tree;
    use crate::domain::{CommitEngine, ImageEntry, PendingMove};
    use chrono::Utc;
    use ratatui::{backend::TestBackend, Terminal};
    use std::path::PathBuf;
    use std::time::Instant;

    fn create_test_entry(name: &str) -> ImageEntry {
        ImageEntry {
            path: PathBuf::from(format!("/img/{}", name)),
            name: name.to_string(),
            size: 2048,
            created: Utc::now(),
        }
    }

    fn sorted_session(names: &[&str]) -> SortSession {
        let mut session = SortSession::new(names.iter().map(|n| create_test_entry(n)).collect());
        session.load_tree(nested_tree());
        session
    }

    fn draw(
        session: &SortSession,
        view: &ViewState,
        info: &FrameInfo,
        width: u16,
        height: u16,
    ) -> String {
        let backend = TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| render_view(frame, session, view, info))
            .unwrap();

        let buffer = terminal.backend().buffer().clone();
        buffer.content().iter().map(|c| c.symbol()).collect()
    }

    fn draw_main(session: &SortSession, info: &FrameInfo) -> String {
        draw(session, &ViewState::Browsing, info, 100, 30)
    }

    mod layout_tests {
        use super::*;

        #[test]
        fn test_render_empty_state() {
            let session = SortSession::new(vec![]);
            let buffer_str = draw_main(&session, &FrameInfo::default());

            assert!(buffer_str.contains("No Images Found"));
            assert!(buffer_str.contains("No images to sort"));
            assert!(buffer_str.contains("No destination loaded"));
        }

        #[test]
        fn test_render_loading_tree() {
            let session = SortSession::new(vec![create_test_entry("a.jpg")]);
            let info = FrameInfo {
                loading_tree: true,
                ..FrameInfo::default()
            };
            assert!(draw_main(&session, &info).contains("Loading folders..."));
        }

        #[test]
        fn test_render_images_and_tree() {
            let session = sorted_session(&["a.jpg", "b.png"]);
            let info = FrameInfo {
                dimensions: Some((640, 480)),
                ..FrameInfo::default()
            };
            let buffer_str = draw_main(&session, &info);

            assert!(buffer_str.contains("Image 1/2"));
            assert!(buffer_str.contains("b.png"));
            assert!(buffer_str.contains("640×480"));
            assert!(buffer_str.contains("[1] a"));
            assert!(buffer_str.contains("[12] y"));
            assert!(buffer_str.contains("[2] b"));
            assert!(buffer_str.contains("No images assigned yet"));
        }

        #[test]
        fn test_render_tree_without_subfolders() {
            let mut session = SortSession::new(vec![create_test_entry("a.jpg")]);
            let empty = FolderTree::build(
                Path::new("/dest"),
                &crate::domain::folder_tree::test_support::MapLister::default(),
            )
            .unwrap();
            session.load_tree(empty);

            assert!(draw_main(&session, &FrameInfo::default()).contains("No subfolders found"));
        }

        #[test]
        fn test_render_footer() {
            let session = sorted_session(&["a.jpg"]);
            let buffer_str = draw_main(&session, &FrameInfo::default());

            assert!(buffer_str.contains("Folder"));
            assert!(buffer_str.contains("Commit"));
            assert!(buffer_str.contains("Quit"));
        }

        #[test]
        fn test_render_dry_run_marker() {
            let session = sorted_session(&["a.jpg"]);
            let info = FrameInfo {
                dry_run: true,
                ..FrameInfo::default()
            };
            assert!(draw_main(&session, &info).contains("[DRY RUN]"));
        }

        #[test]
        fn test_scroll_offset_keeps_selection_visible() {
            assert_eq!(scroll_offset(0, 10), 0);
            assert_eq!(scroll_offset(9, 10), 0);
            assert_eq!(scroll_offset(10, 10), 1);
            assert_eq!(scroll_offset(3, 0), 3);
        }
    }

    mod input_feedback_tests {
        use super::*;

        #[test]
        fn test_status_shows_typed_sequence() {
            let mut session = sorted_session(&["a.jpg"]);
            session.on_digit('1', Instant::now());

            let buffer_str = draw_main(&session, &FrameInfo::default());
            assert!(buffer_str.contains("Sequence: 1"));
            assert!(buffer_str.contains("Auto-advance: off"));
        }

        #[test]
        fn test_status_shows_error() {
            let mut session = sorted_session(&["a.jpg"]);
            session.on_digit('9', Instant::now());

            let buffer_str = draw_main(&session, &FrameInfo::default());
            assert!(buffer_str.contains("Invalid sequence \"9\""));
        }

        #[test]
        fn test_status_shows_notice() {
            let session = sorted_session(&["a.jpg"]);
            let info = FrameInfo {
                notice: Some("Reloaded folders".to_string()),
                ..FrameInfo::default()
            };
            assert!(draw_main(&session, &info).contains("Reloaded folders"));
        }

        #[test]
        fn test_pending_list_shows_relative_target() {
            let mut session = sorted_session(&["a.jpg", "b.png"]);
            session.on_digit('2', Instant::now());

            let buffer_str = draw_main(&session, &FrameInfo::default());
            assert!(buffer_str.contains("Pending (1)"));
            assert!(buffer_str.contains("a.jpg → b"));
            assert!(buffer_str.contains("✓ a.jpg"));
            assert!(buffer_str.contains("1/2 assigned"));
        }

        #[test]
        fn test_pinged_folder_shows_count() {
            let mut session = sorted_session(&["a.jpg"]);
            session.on_digit('2', Instant::now());

            assert!(draw_main(&session, &FrameInfo::default()).contains("[2] b (1)"));
        }
    }

    mod overlay_tests {
        use super::*;

        fn partial_result() -> CommitResult {
            let moves = vec![
                PendingMove {
                    source_image_path: PathBuf::from("/img/one.jpg"),
                    target_folder_path: PathBuf::from("/dest/a"),
                    image_label: "one.jpg".to_string(),
                },
                PendingMove {
                    source_image_path: PathBuf::from("/img/two.jpg"),
                    target_folder_path: PathBuf::from("/dest/b"),
                    image_label: "two.jpg".to_string(),
                },
            ];
            CommitEngine::new(ScriptedCopier::failing_on(&["/img/two.jpg"])).run(&moves)
        }

        #[test]
        fn test_render_help_overlay() {
            let session = sorted_session(&["a.jpg"]);
            let buffer_str = draw(&session, &ViewState::Help, &FrameInfo::default(), 100, 40);

            assert!(buffer_str.contains("Help"));
            assert!(buffer_str.contains("Descend into the n-th subfolder"));
            assert!(buffer_str.contains("Toggle auto-advance"));
        }

        #[test]
        fn test_render_welcome_overlay() {
            let session = sorted_session(&["a.jpg"]);
            let buffer_str = draw(&session, &ViewState::Welcome, &FrameInfo::default(), 120, 40);

            assert!(buffer_str.contains("Welcome to digisort"));
            assert!(buffer_str.contains("Quick Start"));
        }

        #[test]
        fn test_render_confirm_commit() {
            let mut session = sorted_session(&["a.jpg"]);
            session.on_digit('2', Instant::now());
            let info = FrameInfo {
                dry_run: true,
                ..FrameInfo::default()
            };
            let buffer_str = draw(&session, &ViewState::ConfirmCommit, &info, 100, 30);

            assert!(buffer_str.contains("Copy 1 pending image(s)?"));
            assert!(buffer_str.contains("Dry run"));
        }

        #[test]
        fn test_render_confirm_clear() {
            let session = sorted_session(&["a.jpg"]);
            let buffer_str = draw(&session, &ViewState::ConfirmClear, &FrameInfo::default(), 100, 30);
            assert!(buffer_str.contains("Drop all 0 pending move(s)?"));
        }

        #[test]
        fn test_render_committing() {
            let session = sorted_session(&["a.jpg"]);
            let buffer_str = draw(&session, &ViewState::Committing, &FrameInfo::default(), 100, 30);
            assert!(buffer_str.contains("Copying"));
            assert!(buffer_str.contains("Please wait"));
        }

        #[test]
        fn test_render_partial_result() {
            let session = sorted_session(&["a.jpg"]);
            let view = ViewState::CommitResult(partial_result());
            let buffer_str = draw(&session, &view, &FrameInfo::default(), 100, 30);

            assert!(buffer_str.contains("Successfully copied 1 file!"));
            assert!(buffer_str.contains("1 file failed to copy."));
            assert!(buffer_str.contains("Failed to copy \"two.jpg\": access denied"));
            assert!(buffer_str.contains("copy failures to clipboard"));
        }

        #[test]
        fn test_render_aborted_result() {
            let session = sorted_session(&["a.jpg"]);
            let view = ViewState::CommitResult(CommitResult::aborted("worker stopped"));
            let buffer_str = draw(&session, &view, &FrameInfo::default(), 100, 30);

            assert!(buffer_str.contains("Copy operation failed"));
            assert!(buffer_str.contains("worker stopped"));
            assert!(buffer_str.contains("Press any key to continue"));
        }
    }
}
