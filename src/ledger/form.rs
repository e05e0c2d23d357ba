use maud::{Markup, html};

use crate::{
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE},
    ledger::{EntryFormData, EntryId, EntryKind, MIN_ENTRY_NAME_LENGTH},
    split::BudgetSplit,
    upload::{UploadedFile, attachments_input},
};

/// Whether the form records a new entry or updates an existing one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum EntryFormAction {
    Create,
    Update(EntryId),
}

/// The data a payable or receivable form is rendered from.
pub(crate) struct EntryFormView<'a> {
    pub kind: EntryKind,
    pub action: EntryFormAction,
    pub form_data: &'a EntryFormData,
    pub splits: &'a [BudgetSplit],
    pub attachments: &'a [UploadedFile],
}

/// Render the payable or receivable form, with `error_message` above the submit
/// button if it is not empty.
pub(crate) fn entry_form(view: &EntryFormView<'_>, error_message: &str) -> Markup {
    let (post_url, put_url, submit_text) = match view.action {
        EntryFormAction::Create => (Some(view.kind.collection_api().to_owned()), None, "Save"),
        EntryFormAction::Update(id) => (
            None,
            Some(endpoints::format_endpoint(view.kind.item_api(), id)),
            "Update",
        ),
    };

    html! {
        form
            hx-post=[post_url]
            hx-put=[put_url]
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            (entry_form_fields(view))

            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400"
                {
                    (error_message)
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { (submit_text) " " (view.kind.title()) }
        }
    }
}

fn entry_form_fields(view: &EntryFormView<'_>) -> Markup {
    let form_data = view.form_data;
    let counterparty_placeholder = match view.kind {
        EntryKind::Payable => "e.g. Landlord",
        EntryKind::Receivable => "e.g. Employer",
    };

    html! {
        div
        {
            label for="name" class=(FORM_LABEL_STYLE) { "Name" }

            input
                id="name"
                type="text"
                name="name"
                placeholder="e.g. Rent"
                value=(form_data.name)
                minlength=(MIN_ENTRY_NAME_LENGTH)
                required
                autofocus
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

            div class="input-wrapper w-full"
            {
                input
                    id="amount"
                    type="number"
                    name="amount"
                    step="0.01"
                    min="0.01"
                    placeholder="0.00"
                    value=(form_data.amount)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }
        }

        div
        {
            label for="date" class=(FORM_LABEL_STYLE) { "Date" }

            input
                id="date"
                type="date"
                name="date"
                value=(form_data.date)
                required
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label for="counterparty" class=(FORM_LABEL_STYLE) { (view.kind.counterparty_label()) }

            input
                id="counterparty"
                type="text"
                name="counterparty"
                placeholder=(counterparty_placeholder)
                value=(form_data.counterparty.as_deref().unwrap_or_default())
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label for="description" class=(FORM_LABEL_STYLE) { "Description" }

            input
                id="description"
                type="text"
                name="description"
                placeholder="Optional"
                value=(form_data.description.as_deref().unwrap_or_default())
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label for="split_id" class=(FORM_LABEL_STYLE) { "Budget split" }

            select
                id="split_id"
                name="split_id"
                class=(FORM_TEXT_INPUT_STYLE)
            {
                option value="" selected[form_data.split_id.is_none()] { "Other" }

                @for split in view.splits {
                    option value=(split.id) selected[form_data.split_id == Some(split.id)]
                    {
                        (split.name)
                    }
                }
            }
        }

        @if view.kind == EntryKind::Payable {
            (attachments_input(view.attachments))
        }
    }
}

#[cfg(test)]
mod entry_form_tests {
    use scraper::{Html, Selector};
    use time::macros::date;

    use crate::{
        endpoints,
        group::BudgetName,
        ledger::{EntryFormData, EntryKind},
        money::Amount,
        split::BudgetSplit,
        test_utils::{assert_form_input, assert_hx_endpoint, must_get_form},
    };

    use super::{EntryFormAction, EntryFormView, entry_form};

    fn form_data(split_id: Option<i64>) -> EntryFormData {
        EntryFormData {
            name: "Rent".to_owned(),
            amount: "100".to_owned(),
            date: date!(2025 - 06 - 01),
            description: None,
            counterparty: None,
            split_id,
            file_keys: Vec::new(),
        }
    }

    fn render(kind: EntryKind, action: EntryFormAction, form_data: &EntryFormData) -> Html {
        let splits = [BudgetSplit {
            id: 7,
            group_id: 1,
            name: BudgetName::new_unchecked("Housing"),
            description: String::new(),
            amount: Amount::new_unchecked(rust_decimal::Decimal::ONE),
        }];
        let markup = entry_form(
            &EntryFormView {
                kind,
                action,
                form_data,
                splits: &splits,
                attachments: &[],
            },
            "",
        );

        Html::parse_fragment(&markup.into_string())
    }

    #[test]
    fn create_form_posts_to_collection() {
        let html = render(EntryKind::Receivable, EntryFormAction::Create, &form_data(None));
        let form = must_get_form(&html);

        assert_hx_endpoint(&form, endpoints::RECEIVABLES_API, "hx-post");
        assert_form_input(&form, "name", "text");
        assert_form_input(&form, "amount", "number");
        assert_form_input(&form, "date", "date");
    }

    #[test]
    fn update_form_puts_to_item() {
        let html = render(EntryKind::Payable, EntryFormAction::Update(3), &form_data(None));
        let form = must_get_form(&html);

        assert_hx_endpoint(
            &form,
            &endpoints::format_endpoint(endpoints::PAYABLE_API, 3),
            "hx-put",
        );
    }

    #[test]
    fn only_payables_have_attachments() {
        let file_input = Selector::parse("input[type=file]").unwrap();

        let payable = render(EntryKind::Payable, EntryFormAction::Create, &form_data(None));
        let receivable = render(EntryKind::Receivable, EntryFormAction::Create, &form_data(None));

        assert_eq!(payable.select(&file_input).count(), 1);
        assert_eq!(receivable.select(&file_input).count(), 0);
    }

    #[test]
    fn selects_assigned_split() {
        let selected = Selector::parse("select[name=split_id] option[selected]").unwrap();

        let other = render(EntryKind::Payable, EntryFormAction::Create, &form_data(None));
        let housing = render(EntryKind::Payable, EntryFormAction::Create, &form_data(Some(7)));

        let value = |html: &Html| {
            html.select(&selected)
                .next()
                .and_then(|option| option.value().attr("value").map(str::to_owned))
        };
        assert_eq!(value(&other), Some(String::new()));
        assert_eq!(value(&housing), Some("7".to_owned()));
    }
}
