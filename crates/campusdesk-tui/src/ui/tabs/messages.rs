use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::ui::styles;
use crate::utils::{format_timestamp, truncate_string};

/// Width reserved for the compose field cursor and padding
const COMPOSE_FIELD_PADDING: usize = 4;

/// Keep message rows on a single line
const MESSAGE_PREVIEW_LENGTH: usize = 120;

/// Render the Messages tab - compose box above the message list
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5)])
        .split(area);

    render_compose_box(frame, app, chunks[0]);
    render_message_table(frame, app, chunks[1]);
}

fn render_compose_box(frame: &mut Frame, app: &App, area: Rect) {
    let title = if app.sending {
        " Send a Message - sending... ".to_string()
    } else if app.composing {
        " Send a Message - [Enter] Send | [Esc] Cancel ".to_string()
    } else {
        " Send a Message - [i] to compose ".to_string()
    };

    // Show the tail of long drafts so the cursor stays visible
    let field_width = (area.width as usize).saturating_sub(COMPOSE_FIELD_PADDING);
    let text: String = if app.compose_text.chars().count() > field_width {
        let skip = app.compose_text.chars().count() - field_width;
        app.compose_text.chars().skip(skip).collect()
    } else {
        app.compose_text.clone()
    };

    let cursor = if app.composing && !app.sending { "▌" } else { "" };
    let line = Line::from(vec![
        Span::raw(" "),
        Span::styled(text, styles::list_item_style()),
        Span::styled(cursor, styles::highlight_style()),
    ]);

    let block = Block::default()
        .title(title)
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(app.composing));

    let paragraph = Paragraph::new(line).block(block);
    frame.render_widget(paragraph, area);
}

fn render_message_table(frame: &mut Frame, app: &App, area: Rect) {
    let header = Row::new([
        Cell::from("ID"),
        Cell::from("Message"),
        Cell::from("Sent At"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = app
        .messages
        .iter()
        .map(|msg| {
            Row::new(vec![
                Cell::from(format!("{:>4}", msg.id)),
                Cell::from(truncate_string(&msg.message, MESSAGE_PREVIEW_LENGTH)),
                Cell::from(format_timestamp(&msg.created_at)),
            ])
            .style(styles::list_item_style())
        })
        .collect();

    let widths = [
        Constraint::Length(5),
        Constraint::Fill(1),
        Constraint::Length(18),
    ];

    let title = format!(" My Messages ({}) - [u]pdate ", app.messages.len());

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(!app.composing)),
        )
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    state.select(Some(app.message_selection));

    frame.render_stateful_widget(table, area, &mut state);

    if app.messages.is_empty() {
        let text = if app.messages_loading {
            "Loading messages..."
        } else {
            "No messages found"
        };
        let y = area.y + area.height / 2;
        let notice_area = Rect::new(area.x + 2, y, area.width.saturating_sub(4), 1);
        let paragraph = Paragraph::new(Line::from(Span::styled(text, styles::muted_style())))
            .centered();
        frame.render_widget(paragraph, notice_area);
    }
}
