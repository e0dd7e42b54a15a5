use crate::models::Report;

/// Number of attributes compared between a loss report and a found candidate
pub const COMPARED_ATTRIBUTES: u8 = 4;

/// Count the attributes a loss report and a found candidate have in common
///
/// One point each for:
/// - species (exact)
/// - size (exact)
/// - fur color (case-insensitive)
/// - breed (case-insensitive, no point when either side has no breed)
#[inline]
pub fn count_coincidences(loss: &Report, found: &Report) -> u8 {
    let mut coincidences = 0;

    if loss.species == found.species {
        coincidences += 1;
    }

    if loss.size == found.size {
        coincidences += 1;
    }

    if eq_ignore_case(&loss.fur_color, &found.fur_color) {
        coincidences += 1;
    }

    if let (Some(lost_breed), Some(found_breed)) = (&loss.breed, &found.breed) {
        if eq_ignore_case(lost_breed, found_breed) {
            coincidences += 1;
        }
    }

    coincidences
}

/// Unicode-aware case-insensitive comparison ("Caramelo" == "CARAMELO", "Ébano" == "ébano")
#[inline]
fn eq_ignore_case(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}
