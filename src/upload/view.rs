use maud::{Markup, html};

use crate::{
    endpoints,
    html::{FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE},
    upload::{UPLOAD_FIELD_NAME, UploadedFile},
};

/// The id of the element that uploaded image previews are appended to.
pub const ATTACHMENTS_ID: &str = "attachments";

/// A thumbnail of an uploaded image with the hidden input that ties it to the
/// surrounding form.
pub fn attachment_preview(upload: &UploadedFile) -> Markup {
    let url = endpoints::format_endpoint(endpoints::UPLOADED_FILE, &upload.key);

    html! {
        div data-attachment class="relative w-24"
        {
            input type="hidden" name="file_keys" value=(upload.key);

            a href=(url) target="_blank" title=(upload.name)
            {
                img
                    src=(url)
                    alt=(upload.name)
                    class="h-24 w-24 object-cover rounded border border-gray-300 dark:border-gray-600";
            }

            button
                type="button"
                onclick="this.closest('[data-attachment]').remove()"
                class={ "text-xs " (LINK_STYLE) }
            {
                "Remove"
            }
        }
    }
}

/// The upload input and current attachments for the payable form.
///
/// Choosing a file uploads it straight away and appends its preview to the list.
pub fn attachments_input(uploads: &[UploadedFile]) -> Markup {
    html! {
        div
        {
            label for=(UPLOAD_FIELD_NAME) class=(FORM_LABEL_STYLE) { "Receipts" }

            input
                id=(UPLOAD_FIELD_NAME)
                type="file"
                name=(UPLOAD_FIELD_NAME)
                accept="image/*"
                hx-post=(endpoints::UPLOADS_API)
                hx-encoding="multipart/form-data"
                hx-include="this"
                hx-trigger="change"
                hx-target={ "#" (ATTACHMENTS_ID) }
                hx-swap="beforeend"
                hx-target-error="#alert-container"
                class=(FORM_TEXT_INPUT_STYLE);

            div id=(ATTACHMENTS_ID) class="flex flex-wrap gap-2 mt-2"
            {
                @for upload in uploads {
                    (attachment_preview(upload))
                }
            }
        }
    }
}
