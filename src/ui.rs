use ratatui::{
    Frame,
    buffer::Buffer,
    layout::{Constraint, Layout, Position, Rect},
    style::Stylize,
    symbols::border,
    text::Line,
    widgets::{Block, Cell, Clear, Paragraph, Row, Table, Widget},
};

use crate::model::UIData;

pub const FILTER_PROMPT: &str = "Filter: ";
pub const FILTERLINE_HEIGHT: u16 = 3;
pub const STATUSLINE_HEIGHT: u16 = 1;
pub const MAX_COLUMN_WIDTH: u16 = 48;

pub fn draw(uidata: &UIData, frame: &mut Frame) {
    let area = frame.area();
    frame.render_widget(GridView { data: uidata }, area);

    if uidata.active_filter_input {
        // Put the terminal curser into the filter box while editing.
        let x = area.x + 1 + (FILTER_PROMPT.len() + uidata.filter_input.curser_pos) as u16;
        frame.set_cursor_position(Position::new(x.min(area.right().saturating_sub(2)), area.y + 1));
    }
}

struct GridView<'a> {
    data: &'a UIData,
}

impl GridView<'_> {
    fn render_filterline(&self, area: Rect, buf: &mut Buffer) {
        let text = if self.data.active_filter_input {
            &self.data.filter_input.input
        } else {
            &self.data.filter_text
        };
        let line = Line::from(vec![FILTER_PROMPT.into(), text.clone().yellow()]);
        Paragraph::new(line)
            .block(Block::bordered().title(Line::from(format!(" {} ", self.data.title))))
            .render(area, buf);
    }

    fn render_table(&self, area: Rect, buf: &mut Buffer) {
        if self.data.loading {
            Paragraph::new("Loading ...")
                .centered()
                .block(Block::bordered())
                .render(area, buf);
            return;
        }

        let header = Row::new(self.data.headers.iter().enumerate().map(|(idx, name)| {
            let cell = Cell::from(name.clone());
            if idx == self.data.selected_column {
                cell.bold().reversed()
            } else {
                cell.bold()
            }
        }));

        let rows = self
            .data
            .page_rows
            .iter()
            .map(|row| Row::new(row.iter().map(|cell| Cell::from(cell.clone()))));

        Table::new(rows, self.column_widths())
            .header(header)
            .column_spacing(1)
            .block(Block::bordered().border_set(border::THICK))
            .render(area, buf);
    }

    // Columns get their widest cell, capped; the last one takes the rest.
    fn column_widths(&self) -> Vec<Constraint> {
        let ncols = self.data.headers.len();
        let mut widths = Vec::with_capacity(ncols);
        for cidx in 0..ncols {
            if cidx + 1 == ncols {
                widths.push(Constraint::Fill(1));
                continue;
            }
            let mut width = self.data.headers[cidx].chars().count();
            for row in &self.data.page_rows {
                width = std::cmp::max(width, row[cidx].chars().count());
            }
            widths.push(Constraint::Length(
                width.min(MAX_COLUMN_WIDTH as usize) as u16,
            ));
        }
        widths
    }

    fn render_statusline(&self, area: Rect, buf: &mut Buffer) {
        let data = self.data;
        let prev = if data.can_prev { "<" } else { " " };
        let next = if data.can_next { ">" } else { " " };
        let line = Line::from(vec![
            format!(
                " {} Page {}/{} {} | {}/{} rows | {}/page | ",
                prev,
                data.page_index + 1,
                data.page_count,
                next,
                data.filtered_rows,
                data.total_rows,
                data.page_size,
            )
            .bold(),
            data.status_message.clone().dim(),
        ]);
        Paragraph::new(line).render(area, buf);
    }

    fn render_popup(&self, area: Rect, buf: &mut Buffer) {
        let popup = centered(area, 50, 16);
        Clear.render(popup, buf);
        Paragraph::new(self.data.popup_message.clone())
            .block(
                Block::bordered()
                    .title(Line::from(" Help ".bold()).centered())
                    .title_bottom(Line::from(" <Esc> to close ").centered())
                    .border_set(border::THICK),
            )
            .render(popup, buf);
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = std::cmp::min(width, area.width);
    let height = std::cmp::min(height, area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

impl Widget for GridView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let [filterline, table, statusline] = Layout::vertical([
            Constraint::Length(FILTERLINE_HEIGHT),
            Constraint::Min(1),
            Constraint::Length(STATUSLINE_HEIGHT),
        ])
        .areas(area);

        self.render_filterline(filterline, buf);
        self.render_table(table, buf);
        self.render_statusline(statusline, buf);

        if self.data.show_popup {
            self.render_popup(area, buf);
        }
    }
}
