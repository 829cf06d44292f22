// Copyright (c) 2026 rezky_nightky

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorMode {
    Mono,
    Color16,
    Color256,
    TrueColor,
}

impl ColorMode {
    pub fn label(self) -> &'static str {
        match self {
            ColorMode::TrueColor => "24-bit truecolor",
            ColorMode::Color256 => "8-bit (256-color)",
            ColorMode::Color16 => "16-color",
            ColorMode::Mono => "mono",
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backdrop {
    #[value(name = "matrix")]
    Matrix,
    #[value(name = "particles")]
    Particles,
    #[value(name = "both")]
    Both,
    #[value(name = "none")]
    None,
}

impl Backdrop {
    pub fn has_rain(self) -> bool {
        matches!(self, Backdrop::Matrix | Backdrop::Both)
    }

    pub fn has_particles(self) -> bool {
        matches!(self, Backdrop::Particles | Backdrop::Both)
    }
}
