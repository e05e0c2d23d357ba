use maud::{Markup, html};

use crate::{
    group::GroupFormData,
    html::{FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE},
};

/// The name, description and amount inputs shared by the create and edit forms.
pub(crate) fn group_form_fields(form_data: &GroupFormData) -> Markup {
    html! {
        div
        {
            label for="name" class=(FORM_LABEL_STYLE) { "Name" }

            input
                id="name"
                type="text"
                name="name"
                placeholder="e.g. Living costs"
                value=(form_data.name)
                required
                autofocus
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
            label for="amount" class=(FORM_LABEL_STYLE) { "Budgeted amount" }

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
    }
}
