//! Interactive conversion preview: an amount, a pairwise rate, and the
//! bidirectional editing rules that keep both fields consistent.

use crate::core::rate::ExchangeRate;
use rust_decimal::Decimal;

/// Which field the user is actively typing into. The focused field is
/// never re-rendered from model state, otherwise the cursor would jump
/// mid-edit; the opposite field always is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditingField {
    None,
    Base,
    Quote,
}

/// Session state for one conversion pair. The derived quote amount is
/// always `amount_base * rate`; edits to the quote field back-derive the
/// base amount instead of storing a second source of truth.
#[derive(Debug, Clone)]
pub struct ConverterPreview {
    amount_base: Decimal,
    rate: ExchangeRate,
    editing: EditingField,
}

impl ConverterPreview {
    pub fn new(amount_base: Decimal, rate: ExchangeRate) -> Self {
        Self {
            amount_base,
            rate,
            editing: EditingField::None,
        }
    }

    pub fn amount_base(&self) -> Decimal {
        self.amount_base
    }

    pub fn amount_quote(&self) -> Decimal {
        self.amount_base * self.rate.rate
    }

    pub fn rate(&self) -> &ExchangeRate {
        &self.rate
    }

    pub fn editing(&self) -> EditingField {
        self.editing
    }

    pub fn focus_base(&mut self) {
        self.editing = EditingField::Base;
    }

    pub fn focus_quote(&mut self) {
        self.editing = EditingField::Quote;
    }

    /// Ends the edit session; after this both fields render canonically
    /// from model state, replacing any partially typed text.
    pub fn blur(&mut self) {
        self.editing = EditingField::None;
    }

    pub fn set_amount_base(&mut self, amount: Decimal) {
        self.amount_base = amount;
    }

    /// Applies typed input to the base field. Returns `false` (leaving the
    /// model untouched) when the text is not an acceptable amount.
    pub fn set_base_text(&mut self, input: &str) -> bool {
        match parse_amount(input) {
            Some(amount) => {
                self.amount_base = amount;
                true
            }
            None => false,
        }
    }

    /// Applies typed input to the quote field by back-deriving the base
    /// amount. A zero rate yields a zero base instead of dividing by zero.
    pub fn set_quote_text(&mut self, input: &str) -> bool {
        match parse_amount(input) {
            Some(quote) => {
                self.amount_base = quote.checked_div(self.rate.rate).unwrap_or(Decimal::ZERO);
                true
            }
            None => false,
        }
    }

    /// Exchanges base and quote: the rate is inverted in the decimal
    /// domain and the old result becomes the new input. The whole model is
    /// replaced in one step so observers see a single consistent state.
    pub fn swap(&mut self) {
        let inverted = Decimal::ONE
            .checked_div(self.rate.rate)
            .unwrap_or(Decimal::ZERO);
        let rate = ExchangeRate {
            base: self.rate.quote.clone(),
            quote: self.rate.base.clone(),
            rate: inverted,
            updated_at: self.rate.updated_at,
        };
        *self = Self {
            amount_base: self.amount_quote(),
            rate,
            editing: self.editing,
        };
    }
}

/// Parses a localized amount: comma or dot as the decimal separator, at
/// most one separator, at most 8 fractional digits, spaces allowed as
/// grouping. Empty input means zero; anything else unparseable is rejected
/// with `None` so callers can keep the previous state.
pub fn parse_amount(input: &str) -> Option<Decimal> {
    let cleaned: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        return Some(Decimal::ZERO);
    }
    if cleaned.chars().any(|c| !c.is_ascii_digit() && c != '.' && c != ',') {
        return None;
    }

    let parts: Vec<&str> = cleaned.split(['.', ',']).collect();
    if parts.len() > 2 {
        return None;
    }
    if parts.len() == 2 && parts[1].len() > 8 {
        return None;
    }

    cleaned.replace(',', ".").parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::metadata;
    use chrono::Utc;

    fn usd_byn(rate: &str) -> ExchangeRate {
        ExchangeRate {
            base: metadata::fiat_currency("USD"),
            quote: metadata::fiat_currency("BYN"),
            rate: rate.parse().unwrap(),
            updated_at: Utc::now(),
        }
    }

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_quote_derived_from_base() {
        let preview = ConverterPreview::new(dec("100"), usd_byn("0.30"));
        assert_eq!(preview.amount_quote(), dec("30.00"));
    }

    #[test]
    fn test_quote_edit_back_derives_base() {
        let mut preview = ConverterPreview::new(dec("100"), usd_byn("0.30"));
        preview.focus_quote();
        assert!(preview.set_quote_text("60"));
        assert_eq!(preview.amount_base(), dec("200"));
        assert_eq!(preview.amount_quote(), dec("60.00"));
    }

    #[test]
    fn test_quote_edit_with_zero_rate() {
        let mut preview = ConverterPreview::new(dec("100"), usd_byn("0"));
        preview.focus_quote();
        assert!(preview.set_quote_text("60"));
        assert_eq!(preview.amount_base(), Decimal::ZERO);
    }

    #[test]
    fn test_swap_inverts_in_decimal_domain() {
        let mut preview = ConverterPreview::new(dec("100"), usd_byn("3.20"));
        preview.swap();

        assert_eq!(preview.rate().base.code, "BYN");
        assert_eq!(preview.rate().quote.code, "USD");
        assert_eq!(preview.rate().rate, dec("0.3125"));
        assert_eq!(preview.amount_base(), dec("320.00"));
        assert_eq!(preview.amount_quote(), dec("100.0000"));
    }

    #[test]
    fn test_swap_with_zero_rate() {
        let mut preview = ConverterPreview::new(dec("100"), usd_byn("0"));
        preview.swap();
        assert_eq!(preview.rate().rate, Decimal::ZERO);
        assert_eq!(preview.amount_base(), Decimal::ZERO);
    }

    #[test]
    fn test_focus_transitions() {
        let mut preview = ConverterPreview::new(Decimal::ZERO, usd_byn("3.20"));
        assert_eq!(preview.editing(), EditingField::None);
        preview.focus_base();
        assert_eq!(preview.editing(), EditingField::Base);
        preview.focus_quote();
        assert_eq!(preview.editing(), EditingField::Quote);
        preview.blur();
        assert_eq!(preview.editing(), EditingField::None);
    }

    #[test]
    fn test_rejected_input_leaves_model_untouched() {
        let mut preview = ConverterPreview::new(dec("100"), usd_byn("3.20"));
        assert!(!preview.set_base_text("12.34.56"));
        assert!(!preview.set_base_text("abc"));
        assert!(!preview.set_base_text("1.123456789"));
        assert_eq!(preview.amount_base(), dec("100"));
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("100"), Some(dec("100")));
        assert_eq!(parse_amount("3,14"), Some(dec("3.14")));
        assert_eq!(parse_amount("1 234,5"), Some(dec("1234.5")));
        assert_eq!(parse_amount(""), Some(Decimal::ZERO));
        assert_eq!(parse_amount("0.12345678"), Some(dec("0.12345678")));
        assert_eq!(parse_amount("0.123456789"), None);
        assert_eq!(parse_amount("1.2.3"), None);
        assert_eq!(parse_amount("1,2.3"), None);
        assert_eq!(parse_amount("12a"), None);
        assert_eq!(parse_amount("-5"), None);
    }
}
