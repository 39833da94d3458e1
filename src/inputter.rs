use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

// Line editor for the filter box. Every keystroke yields the full edited
// text, so the model can re-filter live while the user is still typing.
#[derive(Default)]
pub struct Inputter {
    current_input: String,
    curser_pos: usize,
    finished: bool,
    canceled: bool,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct InputResult {
    pub input: String,
    pub finished: bool,
    pub canceled: bool,
    pub curser_pos: usize,
}

impl Inputter {
    pub fn read(&mut self, key: KeyEvent) -> InputResult {
        match (key.code, key.modifiers) {
            (KeyCode::Enter, KeyModifiers::NONE) => self.enter(),
            (KeyCode::Esc, KeyModifiers::NONE) => self.escape(),
            (KeyCode::Backspace, KeyModifiers::NONE) => self.backspace(),
            (KeyCode::Left, KeyModifiers::NONE) => self.left(),
            (KeyCode::Right, KeyModifiers::NONE) => self.right(),
            (code, _) => self.key(code),
        }
    }

    // Starts an editing round with `text` as the current content.
    pub fn start(&mut self, text: &str) {
        self.finished = false;
        self.canceled = false;
        self.current_input = text.to_string();
        self.curser_pos = self.current_input.chars().count();
    }

    pub fn get(&self) -> InputResult {
        InputResult {
            input: self.current_input.clone(),
            finished: self.finished,
            canceled: self.canceled,
            curser_pos: self.curser_pos,
        }
    }

    fn enter(&mut self) -> InputResult {
        self.finished = true;
        self.get()
    }

    fn escape(&mut self) -> InputResult {
        self.current_input.clear();
        self.curser_pos = 0;
        self.canceled = true;
        self.finished = true;
        self.get()
    }

    fn backspace(&mut self) -> InputResult {
        if self.curser_pos > 0 {
            self.curser_pos -= 1;
            let pos = self.byte_pos();
            self.current_input.remove(pos);
        }
        self.get()
    }

    fn left(&mut self) -> InputResult {
        self.curser_pos = self.curser_pos.saturating_sub(1);
        self.get()
    }

    fn right(&mut self) -> InputResult {
        if self.curser_pos < self.current_input.chars().count() {
            self.curser_pos += 1;
        }
        self.get()
    }

    fn key(&mut self, code: KeyCode) -> InputResult {
        if let Some(chr) = code.as_char() {
            let pos = self.byte_pos();
            self.current_input.insert(pos, chr);
            self.curser_pos += 1;
        }
        self.get()
    }

    fn byte_pos(&self) -> usize {
        self.current_input
            .char_indices()
            .nth(self.curser_pos)
            .map(|(byte_idx, _)| byte_idx)
            .unwrap_or(self.current_input.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(inputter: &mut Inputter, code: KeyCode) -> InputResult {
        inputter.read(KeyEvent::from(code))
    }

    #[test]
    fn typing_appends_at_the_curser() {
        let mut inputter = Inputter::default();
        inputter.start("");
        press(&mut inputter, KeyCode::Char('a'));
        press(&mut inputter, KeyCode::Char('c'));
        press(&mut inputter, KeyCode::Left);
        let result = press(&mut inputter, KeyCode::Char('b'));
        assert_eq!(result.input, "abc");
        assert!(!result.finished);
    }

    #[test]
    fn backspace_removes_before_the_curser() {
        let mut inputter = Inputter::default();
        inputter.start("alice");
        press(&mut inputter, KeyCode::Left);
        let result = press(&mut inputter, KeyCode::Backspace);
        assert_eq!(result.input, "alie");
        assert_eq!(result.curser_pos, 3);
    }

    #[test]
    fn enter_finishes_and_keeps_the_text() {
        let mut inputter = Inputter::default();
        inputter.start("bob");
        let result = press(&mut inputter, KeyCode::Enter);
        assert!(result.finished);
        assert!(!result.canceled);
        assert_eq!(result.input, "bob");
    }

    #[test]
    fn escape_cancels_and_clears() {
        let mut inputter = Inputter::default();
        inputter.start("bob");
        let result = press(&mut inputter, KeyCode::Esc);
        assert!(result.finished);
        assert!(result.canceled);
        assert_eq!(result.input, "");
    }

    #[test]
    fn start_resets_a_finished_round() {
        let mut inputter = Inputter::default();
        inputter.start("x");
        press(&mut inputter, KeyCode::Enter);
        inputter.start("y");
        let result = inputter.get();
        assert!(!result.finished);
        assert_eq!(result.input, "y");
        assert_eq!(result.curser_pos, 1);
    }
}
