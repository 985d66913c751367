use may_minihttp::Response as WireResponse;

use crate::dispatcher::Response;
use crate::route::status::reason;

/// Copy a pipeline response onto the wire.
pub(crate) fn write_response(res: &mut WireResponse, response: Response) {
    res.status_code(usize::from(response.status), reason(response.status));
    if let Some(content_type) = response.content_type {
        res.header(content_type.header_line());
    }
    res.body_vec(response.body);
}
