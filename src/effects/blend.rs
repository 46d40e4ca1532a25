use crate::foundation::core::Color;

/// Compositing operator applied when a draw lands on the destination.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    Clear,
    Src,
    Dst,
    #[default]
    SrcOver,
    DstOver,
    SrcIn,
    DstIn,
    SrcOut,
    DstOut,
    SrcATop,
    DstATop,
    Xor,
    Plus,
    Modulate,
    Screen,
    Overlay,
    Darken,
    Lighten,
    ColorDodge,
    ColorBurn,
    HardLight,
    SoftLight,
    Difference,
    Exclusion,
    Multiply,
    Hue,
    Saturation,
    Color,
    Luminosity,
}

impl BlendMode {
    /// Return `true` for the Porter-Duff coefficient modes.
    pub fn is_porter_duff(self) -> bool {
        self.porter_duff_coeffs().is_some()
    }

    /// Return `true` when drawing transparent black with this mode can change the destination.
    ///
    /// Such modes make an otherwise empty draw affect the whole clip.
    pub fn affects_transparent_source(self) -> bool {
        matches!(
            self,
            Self::Clear | Self::Src | Self::SrcIn | Self::DstIn | Self::SrcOut | Self::DstATop
                | Self::Modulate
        )
    }

    // (Fs, Fd) as functions of (src alpha, dst alpha).
    fn porter_duff_coeffs(self) -> Option<fn(f32, f32) -> (f32, f32)> {
        let coeffs: fn(f32, f32) -> (f32, f32) = match self {
            Self::Clear => |_, _| (0.0, 0.0),
            Self::Src => |_, _| (1.0, 0.0),
            Self::Dst => |_, _| (0.0, 1.0),
            Self::SrcOver => |sa, _| (1.0, 1.0 - sa),
            Self::DstOver => |_, da| (1.0 - da, 1.0),
            Self::SrcIn => |_, da| (da, 0.0),
            Self::DstIn => |sa, _| (0.0, sa),
            Self::SrcOut => |_, da| (1.0 - da, 0.0),
            Self::DstOut => |sa, _| (0.0, 1.0 - sa),
            Self::SrcATop => |sa, da| (da, 1.0 - sa),
            Self::DstATop => |sa, da| (1.0 - da, sa),
            Self::Xor => |sa, da| (1.0 - da, 1.0 - sa),
            Self::Plus => |_, _| (1.0, 1.0),
            _ => return None,
        };
        Some(coeffs)
    }

    /// Composite `src` over `dst` with this mode, on straight-alpha colors.
    pub fn blend_colors(self, src: Color, dst: Color) -> Color {
        let [sa, sr, sg, sb] = src.to_argb_f32();
        let [da, dr, dg, db] = dst.to_argb_f32();
        let s = [sr * sa, sg * sa, sb * sa];
        let d = [dr * da, dg * da, db * da];

        if self == Self::Modulate {
            return premul_to_color(sa * da, [s[0] * d[0], s[1] * d[1], s[2] * d[2]]);
        }

        if let Some(coeffs) = self.porter_duff_coeffs() {
            let (fs, fd) = coeffs(sa, da);
            let out_a = (fs * sa + fd * da).min(1.0);
            let out = [
                (fs * s[0] + fd * d[0]).min(1.0),
                (fs * s[1] + fd * d[1]).min(1.0),
                (fs * s[2] + fd * d[2]).min(1.0),
            ];
            return premul_to_color(out_a, out);
        }

        let cs = [sr, sg, sb];
        let cb = [dr, dg, db];
        let mixed = match self {
            Self::Hue => set_lum(set_sat(cs, sat(cb)), lum(cb)),
            Self::Saturation => set_lum(set_sat(cb, sat(cs)), lum(cb)),
            Self::Color => set_lum(cs, lum(cb)),
            Self::Luminosity => set_lum(cb, lum(cs)),
            _ => [
                self.separable(cb[0], cs[0]),
                self.separable(cb[1], cs[1]),
                self.separable(cb[2], cs[2]),
            ],
        };

        let out_a = sa + da - sa * da;
        let out = [0, 1, 2].map(|i| s[i] * (1.0 - da) + d[i] * (1.0 - sa) + sa * da * mixed[i]);
        premul_to_color(out_a, out)
    }

    fn separable(self, cb: f32, cs: f32) -> f32 {
        match self {
            Self::Multiply => cb * cs,
            Self::Screen => cb + cs - cb * cs,
            Self::Overlay => Self::HardLight.separable(cs, cb),
            Self::Darken => cb.min(cs),
            Self::Lighten => cb.max(cs),
            Self::ColorDodge => {
                if cb == 0.0 {
                    0.0
                } else if cs >= 1.0 {
                    1.0
                } else {
                    (cb / (1.0 - cs)).min(1.0)
                }
            }
            Self::ColorBurn => {
                if cb >= 1.0 {
                    1.0
                } else if cs <= 0.0 {
                    0.0
                } else {
                    1.0 - ((1.0 - cb) / cs).min(1.0)
                }
            }
            Self::HardLight => {
                if cs <= 0.5 {
                    cb * 2.0 * cs
                } else {
                    let s = 2.0 * cs - 1.0;
                    cb + s - cb * s
                }
            }
            Self::SoftLight => {
                if cs <= 0.5 {
                    cb - (1.0 - 2.0 * cs) * cb * (1.0 - cb)
                } else {
                    let d = if cb <= 0.25 {
                        ((16.0 * cb - 12.0) * cb + 4.0) * cb
                    } else {
                        cb.sqrt()
                    };
                    cb + (2.0 * cs - 1.0) * (d - cb)
                }
            }
            Self::Difference => (cb - cs).abs(),
            Self::Exclusion => cb + cs - 2.0 * cb * cs,
            _ => cs,
        }
    }
}

fn premul_to_color(a: f32, premul: [f32; 3]) -> Color {
    if a <= 0.0 {
        return Color::TRANSPARENT;
    }
    Color::from_argb_f32([a, premul[0] / a, premul[1] / a, premul[2] / a])
}

fn lum(c: [f32; 3]) -> f32 {
    0.3 * c[0] + 0.59 * c[1] + 0.11 * c[2]
}

fn clip_color(c: [f32; 3]) -> [f32; 3] {
    let l = lum(c);
    let n = c[0].min(c[1]).min(c[2]);
    let x = c[0].max(c[1]).max(c[2]);
    c.map(|v| {
        let mut v = v;
        if n < 0.0 {
            v = l + (v - l) * l / (l - n);
        }
        if x > 1.0 {
            v = l + (v - l) * (1.0 - l) / (x - l);
        }
        v
    })
}

fn set_lum(c: [f32; 3], l: f32) -> [f32; 3] {
    let d = l - lum(c);
    clip_color(c.map(|v| v + d))
}

fn sat(c: [f32; 3]) -> f32 {
    c[0].max(c[1]).max(c[2]) - c[0].min(c[1]).min(c[2])
}

fn set_sat(c: [f32; 3], s: f32) -> [f32; 3] {
    let max = c[0].max(c[1]).max(c[2]);
    let min = c[0].min(c[1]).min(c[2]);
    if max <= min {
        return [0.0; 3];
    }
    c.map(|v| (v - min) * s / (max - min))
}

#[cfg(test)]
#[path = "../../tests/unit/effects/blend.rs"]
mod tests;
