use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::{App, AppState, Focus, StudentSortColumn};
use crate::ui::styles;

/// Render the Students tab - sortable roster table with a detail pane
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(area);

    render_student_table(frame, app, chunks[0]);
    render_student_detail(frame, app, chunks[1]);
}

fn render_student_table(frame: &mut Frame, app: &App, area: Rect) {
    let sorted_students = app.get_sorted_students();
    let focused = matches!(app.focus, Focus::List);

    // Build header with sort indicators
    let sort_indicator = |col: StudentSortColumn| {
        if app.student_sort_column == col {
            if app.student_sort_ascending {
                " ▲"
            } else {
                " ▼"
            }
        } else {
            ""
        }
    };

    let header_cells = [
        Cell::from("ID"),
        Cell::from(format!("Name{}", sort_indicator(StudentSortColumn::Name))),
        Cell::from(format!("Email{}", sort_indicator(StudentSortColumn::Email))),
        Cell::from(format!("Major{}", sort_indicator(StudentSortColumn::Major))),
        Cell::from(format!("Yr{}", sort_indicator(StudentSortColumn::Year))),
    ];

    let header = Row::new(header_cells)
        .style(styles::title_style())
        .height(1);

    let rows: Vec<Row> = sorted_students
        .iter()
        .map(|student| {
            Row::new(vec![
                Cell::from(format!("{:>4}", student.id)),
                Cell::from(student.full_name()),
                Cell::from(student.email.clone()),
                Cell::from(student.major_display().to_string()),
                Cell::from(format!("{:>2}", student.year)),
            ])
            .style(styles::list_item_style())
        })
        .collect();

    let widths = [
        Constraint::Length(5),
        Constraint::Percentage(28),
        Constraint::Fill(3),
        Constraint::Fill(2),
        Constraint::Length(4),
    ];

    let title = build_table_title(app, sorted_students.len());

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(focused)),
        )
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    state.select(Some(app.student_selection));

    frame.render_stateful_widget(table, area, &mut state);

    // Empty-state and loading messages inside the table area
    if sorted_students.is_empty() {
        let text = if app.students_loading {
            "Loading students..."
        } else if !app.search_query.is_empty() {
            "No students match the search"
        } else {
            "No students found"
        };
        render_centered_notice(frame, area, text);
    }
}

fn build_table_title(app: &App, count: usize) -> String {
    if matches!(app.state, AppState::Searching) {
        format!(" Students ({}) - /{}▌ ", count, app.search_query)
    } else if !app.search_query.is_empty() {
        format!(" Students ({}) - /{} ", count, app.search_query)
    } else {
        format!(
            " Students ({}) - [n]ame [e]mail [m]ajor [y]ear ",
            count
        )
    }
}

fn render_centered_notice(frame: &mut Frame, area: Rect, text: &str) {
    let y = area.y + area.height / 2;
    let notice_area = Rect::new(area.x + 2, y, area.width.saturating_sub(4), 1);
    let paragraph = Paragraph::new(Line::from(Span::styled(text, styles::muted_style())))
        .centered();
    frame.render_widget(paragraph, notice_area);
}

fn render_student_detail(frame: &mut Frame, app: &App, area: Rect) {
    let focused = matches!(app.focus, Focus::Detail);
    let placeholder = "-";

    let content = match app.selected_student() {
        Some(student) => {
            let mut lines = vec![];

            lines.push(Line::from(Span::styled(
                student.full_name(),
                styles::title_style(),
            )));
            lines.push(Line::from(""));

            lines.push(Line::from(vec![
                Span::styled("ID:     ", styles::muted_style()),
                Span::raw(student.id.to_string()),
            ]));
            lines.push(Line::from(vec![
                Span::styled("Email:  ", styles::muted_style()),
                Span::raw(student.email.clone()),
            ]));
            lines.push(Line::from(vec![
                Span::styled("Major:  ", styles::muted_style()),
                Span::raw(student.major_display().to_string()),
            ]));
            let year = if student.year == 0 {
                placeholder.to_string()
            } else {
                student.year.to_string()
            };
            lines.push(Line::from(vec![
                Span::styled("Year:   ", styles::muted_style()),
                Span::raw(year),
            ]));

            lines.push(Line::from(""));
            lines.push(Line::from(vec![
                Span::styled("[Enter] ", styles::help_key_style()),
                Span::styled("Open messages", styles::muted_style()),
            ]));

            lines
        }
        None => vec![Line::from(Span::styled(
            "No student selected",
            styles::muted_style(),
        ))],
    };

    let block = Block::default()
        .title(" Details ")
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused));

    let paragraph = Paragraph::new(content).block(block);
    frame.render_widget(paragraph, area);
}
