//! The shared transaction form used by the create and edit pages.

use std::str::FromStr;

use maud::{Markup, PreEscaped, html};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    Error,
    category::{Category, CategoryId},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE, FORM_RADIO_INPUT_STYLE,
        FORM_RADIO_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
    },
    transaction::{Kind, TransactionBuilder},
};

/// Date format used by `<input type="date">`, e.g. "2024-03-15".
const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// The raw data entered by the user in the transaction form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct TransactionFormData {
    /// The amount as typed, parsed into a decimal server-side.
    pub amount: String,
    /// The income/expense kind.
    pub kind: Kind,
    /// The transaction date as `YYYY-MM-DD`.
    pub date: String,
    /// Free text description.
    #[serde(default)]
    pub description: String,
    /// The selected category ID. The form marks the select as required, but
    /// the value is still re-checked server-side.
    #[serde(default)]
    pub category_id: Option<String>,
}

/// Parse a `YYYY-MM-DD` string from a date input.
pub(crate) fn parse_date(raw_date: &str) -> Result<Date, Error> {
    Date::parse(raw_date.trim(), DATE_FORMAT).map_err(|_| Error::InvalidDate(raw_date.to_owned()))
}

/// Convert the raw form data into a validated [TransactionBuilder].
///
/// # Errors
/// Returns a:
/// - [Error::InvalidAmount] if the amount is not a positive decimal,
/// - [Error::InvalidDate] if the date is not a calendar date,
/// - [Error::InvalidCategory] if the category ID is not an integer.
pub(super) fn parse_transaction_form(form: &TransactionFormData) -> Result<TransactionBuilder, Error> {
    let amount = Decimal::from_str(form.amount.trim())
        .map_err(|_| Error::InvalidAmount(form.amount.clone()))?;

    if amount <= Decimal::ZERO {
        return Err(Error::InvalidAmount(form.amount.clone()));
    }

    let date = parse_date(&form.date)?;

    let category_id = match form.category_id.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw_id) => Some(
            raw_id
                .parse::<CategoryId>()
                .map_err(|_| Error::InvalidCategory(None))?,
        ),
    };

    Ok(TransactionBuilder {
        amount,
        kind: form.kind,
        date,
        description: form.description.trim().to_owned(),
        category_id,
    })
}

/// The values used to pre-fill the transaction form.
pub(super) struct TransactionFormValues {
    pub amount: String,
    pub kind: Kind,
    pub date: Date,
    pub description: String,
    pub category_id: Option<CategoryId>,
}

/// Render the transaction form fields.
///
/// The category select lists the user's categories for both kinds and filters
/// them client-side to the selected kind; the server re-checks the pairing on
/// submit.
pub(super) fn transaction_form_fields(
    categories: &[Category],
    values: &TransactionFormValues,
) -> Markup {
    html! {
        div
        {
            label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

            input
                id="amount"
                type="number"
                name="amount"
                step="0.01"
                min="0.01"
                placeholder="0.00"
                value=(values.amount)
                required
                autofocus
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            span class=(FORM_LABEL_STYLE) { "Type" }

            div class=(FORM_RADIO_GROUP_STYLE)
            {
                @for kind in [Kind::Expense, Kind::Income] {
                    label class=(FORM_RADIO_LABEL_STYLE)
                    {
                        input
                            type="radio"
                            name="kind"
                            value=(kind)
                            checked[values.kind == kind]
                            onchange="filterCategoryOptions()"
                            class=(FORM_RADIO_INPUT_STYLE);

                        " " (kind.label())
                    }
                }
            }
        }

        div
        {
            label for="date" class=(FORM_LABEL_STYLE) { "Date" }

            input
                id="date"
                type="date"
                name="date"
                value=(values.date)
                required
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label for="category_id" class=(FORM_LABEL_STYLE) { "Category" }

            select
                id="category_id"
                name="category_id"
                required
                class=(FORM_TEXT_INPUT_STYLE)
            {
                option value="" disabled selected[values.category_id.is_none()]
                {
                    "Select a category"
                }

                @for category in categories {
                    option
                        value=(category.id)
                        data-kind=(category.kind)
                        selected[values.category_id == Some(category.id)]
                    {
                        (category.name)
                    }
                }
            }
        }

        div
        {
            label for="description" class=(FORM_LABEL_STYLE) { "Description" }

            input
                id="description"
                type="text"
                name="description"
                placeholder="What was this for?"
                value=(values.description)
                class=(FORM_TEXT_INPUT_STYLE);
        }
    }
}

/// The submit button for the transaction form.
pub(super) fn transaction_form_submit_button(text: &str) -> Markup {
    html! {
        button type="submit" class=(BUTTON_PRIMARY_STYLE) { (text) }
    }
}

/// Script that hides category options whose kind does not match the selected
/// transaction kind.
pub(super) fn category_filter_script() -> Markup {
    html! {
        script
        {
            (PreEscaped(r#"
            function filterCategoryOptions() {
                const kindInput = document.querySelector('input[name="kind"]:checked');
                if (!kindInput) {
                    return;
                }

                const select = document.getElementById('category_id');
                for (const option of select.options) {
                    if (!option.dataset.kind) {
                        continue;
                    }

                    const matches = option.dataset.kind === kindInput.value;
                    option.hidden = !matches;
                    if (!matches && option.selected) {
                        select.value = '';
                    }
                }
            }

            document.addEventListener('DOMContentLoaded', filterCategoryOptions);
            "#))
        }
    }
}

#[cfg(test)]
mod parse_transaction_form_tests {
    use time::macros::date;

    use crate::{Error, transaction::Kind};

    use super::{TransactionFormData, parse_date, parse_transaction_form};

    fn form(amount: &str, date: &str, category_id: Option<&str>) -> TransactionFormData {
        TransactionFormData {
            amount: amount.to_owned(),
            kind: Kind::Expense,
            date: date.to_owned(),
            description: "  trimmed  ".to_owned(),
            category_id: category_id.map(str::to_owned),
        }
    }

    #[test]
    fn parses_valid_form() {
        let builder = parse_transaction_form(&form("12.30", "2024-03-15", Some("3"))).unwrap();

        assert_eq!(builder.amount, "12.30".parse().unwrap());
        assert_eq!(builder.kind, Kind::Expense);
        assert_eq!(builder.date, date!(2024 - 03 - 15));
        assert_eq!(builder.description, "trimmed");
        assert_eq!(builder.category_id, Some(3));
    }

    #[test]
    fn rejects_non_numeric_amount() {
        let result = parse_transaction_form(&form("abc", "2024-03-15", None));

        assert_eq!(result, Err(Error::InvalidAmount("abc".to_owned())));
    }

    #[test]
    fn rejects_non_positive_amount() {
        for amount in ["0", "-5"] {
            let result = parse_transaction_form(&form(amount, "2024-03-15", None));

            assert_eq!(result, Err(Error::InvalidAmount(amount.to_owned())));
        }
    }

    #[test]
    fn rejects_malformed_date() {
        let result = parse_transaction_form(&form("12.30", "15/03/2024", None));

        assert_eq!(
            result,
            Err(Error::InvalidDate("15/03/2024".to_owned()))
        );
    }

    #[test]
    fn treats_empty_category_as_none() {
        let builder = parse_transaction_form(&form("12.30", "2024-03-15", Some(""))).unwrap();

        assert_eq!(builder.category_id, None);
    }

    #[test]
    fn parse_date_accepts_iso_dates() {
        assert_eq!(parse_date("2024-03-15"), Ok(date!(2024 - 03 - 15)));
        assert_eq!(parse_date(" 2024-03-15 "), Ok(date!(2024 - 03 - 15)));
    }
}
