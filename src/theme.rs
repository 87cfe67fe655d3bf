use ratatui::style::Color;

pub const BACKGROUND: Color = Color::Rgb(26, 27, 38); // #1A1B26
pub const FOREGROUND: Color = Color::Rgb(169, 177, 214); // #A9B1D6
pub const RED: Color = Color::Rgb(247, 118, 142); // #F7768E
pub const GREEN: Color = Color::Rgb(158, 206, 106); // #9ECE6A
pub const YELLOW: Color = Color::Rgb(224, 175, 104); // #E0AF68
pub const BLUE: Color = Color::Rgb(122, 162, 247); // #7AA2F7
pub const PURPLE: Color = Color::Rgb(187, 154, 247); // #BB9AF7
pub const CYAN: Color = Color::Rgb(125, 207, 255); // #7DCFFF
// pub const WHITE: Color = Color::Rgb(192, 202, 245); // #C0CAF5

pub const BRIGHT_BLACK: Color = Color::Rgb(65, 72, 104); // #414868
pub const BRIGHT_PURPLE: Color = Color::Rgb(157, 124, 216); // #9D7CD8
