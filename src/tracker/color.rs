use super::percentile::map_range;

pub const MIDPOINT_COLOR: &str = "#FFFFFF";

/// Menu color for a distance-from-high percentile: green near the high, white at
/// 50, red near the low. The two halves scale over 0..49 and 51..100.
pub fn distance_color(percentile: i64) -> String {
    let p = percentile as f64;
    if percentile < 50 {
        let c = channel(map_range(p, 0.0, 49.0, 0.0, 228.0));
        format!("#{c:02x}FF{c:02x}")
    } else if percentile == 50 {
        MIDPOINT_COLOR.to_string()
    } else {
        let c = channel(map_range(p, 51.0, 100.0, 228.0, 0.0));
        format!("#FF{c:02x}{c:02x}")
    }
}

fn channel(value: f64) -> u8 {
    value.round_ties_even().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchors() {
        assert_eq!(distance_color(0), "#00FF00");
        assert_eq!(distance_color(50), "#FFFFFF");
        assert_eq!(distance_color(100), "#FF0000");
    }

    #[test]
    fn jumps_around_the_midpoint() {
        assert_eq!(distance_color(49), "#e4FFe4");
        assert_eq!(distance_color(51), "#FFe4e4");
    }

    #[test]
    fn quarter_points() {
        assert_eq!(distance_color(25), "#74FF74");
        assert_eq!(distance_color(75), "#FF7474");
    }

    #[test]
    fn green_side_channels_rise_with_percentile() {
        let mut prev = None;
        for p in 0..50 {
            let color = distance_color(p);
            let r = u8::from_str_radix(&color[1..3], 16).unwrap();
            let b = u8::from_str_radix(&color[5..7], 16).unwrap();
            assert_eq!(&color[3..5], "FF");
            assert_eq!(r, b);
            if let Some(prev) = prev {
                assert!(r > prev, "p={p}");
            }
            prev = Some(r);
        }
    }

    #[test]
    fn out_of_range_saturates() {
        assert_eq!(distance_color(-20), "#00FF00");
        assert_eq!(distance_color(120), "#FF0000");
    }
}
