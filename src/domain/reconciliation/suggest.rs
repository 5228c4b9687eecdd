use crate::domain::invoice::Customer;

/// Normalizes a label for matching: lowercase, `_`/`-`/`.` become spaces, whitespace collapsed.
pub fn normalize_label(text: &str) -> String {
  text
    .to_lowercase()
    .replace(['_', '-', '.'], " ")
    .split_whitespace()
    .collect::<Vec<_>>()
    .join(" ")
}

/// Guesses which customer a group label (usually a file name) belongs to.
///
/// Substring matches are tried first, longest customer name first. Failing that, each label
/// token longer than 3 characters is compared against the whole customer name, allowing one
/// edit for names up to 5 characters and two edits beyond that.
pub fn suggest_customer<'c>(label: &str, customers: &'c [Customer]) -> Option<&'c Customer> {
  let normalized = normalize_label(label);
  if normalized.is_empty() {
    return None;
  }

  let mut candidates: Vec<(&Customer, String)> = customers
    .iter()
    .map(|customer| (customer, normalize_label(customer.name.value())))
    .collect();
  candidates.sort_by(|(a, _), (b, _)| {
    b.name
      .value()
      .chars()
      .count()
      .cmp(&a.name.value().chars().count())
  });

  if let Some((customer, _)) = candidates
    .iter()
    .find(|(_, name)| !name.is_empty() && normalized.contains(name.as_str()))
  {
    return Some(*customer);
  }

  let tokens: Vec<&str> = normalized
    .split(' ')
    .filter(|token| token.chars().count() > 3)
    .collect();

  candidates
    .iter()
    .filter(|(_, name)| name.chars().count() > 3)
    .find(|(_, name)| {
      let threshold = if name.chars().count() <= 5 { 1 } else { 2 };
      tokens
        .iter()
        .any(|token| levenshtein_distance(token, name) <= threshold)
    })
    .map(|(customer, _)| *customer)
}

/// Minimum number of single-character insertions, deletions or substitutions between two strings.
fn levenshtein_distance(a: &str, b: &str) -> usize {
  let a: Vec<char> = a.chars().collect();
  let b: Vec<char> = b.chars().collect();

  if a.is_empty() {
    return b.len();
  }
  if b.is_empty() {
    return a.len();
  }

  let mut previous: Vec<usize> = (0..=b.len()).collect();
  let mut current = vec![0; b.len() + 1];

  for (i, ca) in a.iter().enumerate() {
    current[0] = i + 1;
    for (j, cb) in b.iter().enumerate() {
      let cost = usize::from(ca != cb);
      current[j + 1] = (previous[j] + cost)
        .min(previous[j + 1] + 1)
        .min(current[j] + 1);
    }
    std::mem::swap(&mut previous, &mut current);
  }

  previous[b.len()]
}
