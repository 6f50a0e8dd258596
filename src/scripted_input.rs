use bracket_terminal::prelude::VirtualKeyCode;
use log::warn;
use std::{fs, io, path::Path};

/// Key presses replayed one per frame, ahead of live input.
pub struct ScriptedInput {
    script_commands: Vec<VirtualKeyCode>,
    current_command_index: usize,
}

impl ScriptedInput {
    pub fn from_file<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(Self::parse(&text))
    }

    /// One key per character; blank lines and `#` comments are skipped.
    pub fn parse(text: &str) -> Self {
        let mut script_commands = Vec::new();
        for line in text.lines() {
            let trimmed_line = line.trim_end_matches(['\r', '\n']);
            if trimmed_line.trim().is_empty() || trimmed_line.trim_start().starts_with('#') {
                continue;
            }
            for char_code in trimmed_line.chars() {
                match char_to_virtualkeycode(char_code) {
                    Some(key) => script_commands.push(key),
                    None => warn!("unknown key in script: {char_code:?}"),
                }
            }
        }
        Self {
            script_commands,
            current_command_index: 0,
        }
    }

    pub fn next_key(&mut self) -> Option<VirtualKeyCode> {
        let key = self.script_commands.get(self.current_command_index).copied()?;
        self.current_command_index += 1;
        Some(key)
    }

    pub fn is_finished(&self) -> bool {
        self.current_command_index >= self.script_commands.len()
    }
}

fn char_to_virtualkeycode(c: char) -> Option<VirtualKeyCode> {
    match c {
        'w' | 'W' => Some(VirtualKeyCode::W),
        'a' | 'A' => Some(VirtualKeyCode::A),
        's' | 'S' => Some(VirtualKeyCode::S),
        'd' | 'D' => Some(VirtualKeyCode::D),
        '<' => Some(VirtualKeyCode::Left),
        '>' => Some(VirtualKeyCode::Right),
        'e' | 'E' => Some(VirtualKeyCode::E),
        'h' | 'H' => Some(VirtualKeyCode::H),
        ' ' => Some(VirtualKeyCode::Space),
        'c' | 'C' => Some(VirtualKeyCode::C),
        'p' | 'P' => Some(VirtualKeyCode::P),
        'f' | 'F' => Some(VirtualKeyCode::F),
        '\t' => Some(VirtualKeyCode::Tab),
        '1' => Some(VirtualKeyCode::Key1),
        '2' => Some(VirtualKeyCode::Key2),
        '3' => Some(VirtualKeyCode::Key3),
        '4' => Some(VirtualKeyCode::Key4),
        '5' => Some(VirtualKeyCode::Key5),
        '6' => Some(VirtualKeyCode::Key6),
        '7' => Some(VirtualKeyCode::Key7),
        '8' => Some(VirtualKeyCode::Key8),
        '9' => Some(VirtualKeyCode::Key9),
        '.' => Some(VirtualKeyCode::Period), // idle frame
        'q' | 'Q' | '\x1B' => Some(VirtualKeyCode::Escape),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_comments_and_unknown_keys() {
        let mut script = ScriptedInput::parse("# warm up\n\nww<e\n  # indented note\n1?f\n");
        let keys: Vec<_> = std::iter::from_fn(|| script.next_key()).collect();
        assert_eq!(
            keys,
            vec![
                VirtualKeyCode::W,
                VirtualKeyCode::W,
                VirtualKeyCode::Left,
                VirtualKeyCode::E,
                VirtualKeyCode::Key1,
                VirtualKeyCode::F,
            ]
        );
        assert!(script.is_finished());
    }

    #[test]
    fn reads_scripts_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("run.keys");
        fs::write(&path, "d. q\n").expect("write");
        let mut script = ScriptedInput::from_file(&path).expect("script");
        assert_eq!(script.next_key(), Some(VirtualKeyCode::D));
        assert_eq!(script.next_key(), Some(VirtualKeyCode::Period));
        assert_eq!(script.next_key(), Some(VirtualKeyCode::Space));
        assert_eq!(script.next_key(), Some(VirtualKeyCode::Escape));
        assert_eq!(script.next_key(), None);
    }
}
